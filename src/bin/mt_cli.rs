//! CLI driver for the matryoshka-nested B+ tree index.
//!
//! Usage:
//!   mt_cli bench <workload> <n>
//!   mt_cli bulk <n>
//!   mt_cli scenario <name>
//!
//! Workloads: `insert`, `search`, `delete`, `iterate`.

use matryoshka_index::Tree;
use serde::Serialize;
use std::env;
use std::process::exit;
use std::time::Instant;

#[derive(Serialize)]
struct BenchRecord {
    library: &'static str,
    workload: String,
    n: usize,
    ops: usize,
    elapsed_sec: f64,
    mops: f64,
    ns_per_op: f64,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage_and_exit();
    }

    match args[1].as_str() {
        "bench" => {
            if args.len() != 4 {
                eprintln!("Usage: mt_cli bench <workload> <n>");
                exit(1);
            }
            let workload = &args[2];
            let n: usize = match args[3].parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("ERROR: <n> must be a non-negative integer");
                    exit(1);
                }
            };
            run_bench(workload, n);
        }
        "bulk" => {
            if args.len() != 3 {
                eprintln!("Usage: mt_cli bulk <n>");
                exit(1);
            }
            let n: usize = match args[2].parse() {
                Ok(n) => n,
                Err(_) => {
                    eprintln!("ERROR: <n> must be a non-negative integer");
                    exit(1);
                }
            };
            run_bulk(n);
        }
        "scenario" => {
            if args.len() != 3 {
                eprintln!("Usage: mt_cli scenario <name>");
                exit(1);
            }
            run_scenario(&args[2]);
        }
        _ => usage_and_exit(),
    }
}

fn usage_and_exit() -> ! {
    eprintln!("Usage: mt_cli <command> [args...]");
    eprintln!("Commands:");
    eprintln!("  bench <workload> <n>  - Run a timed workload and emit a JSON record");
    eprintln!("  bulk <n>              - Bulk-load n keys and report tree shape");
    eprintln!("  scenario <name>       - Run one named correctness scenario");
    exit(1);
}

fn run_bench(workload: &str, n: usize) {
    let keys: Vec<i32> = (0..n as i32).collect();

    let (ops, elapsed_sec) = match workload {
        "insert" => {
            let mut tree = Tree::create();
            let start = Instant::now();
            for &k in &keys {
                tree.insert(k);
            }
            (n, start.elapsed().as_secs_f64())
        }
        "search" => {
            let tree = Tree::bulk_load(&keys).expect("bench input is sorted");
            let start = Instant::now();
            for &k in &keys {
                std::hint::black_box(tree.search(k));
            }
            (n, start.elapsed().as_secs_f64())
        }
        "delete" => {
            let mut tree = Tree::bulk_load(&keys).expect("bench input is sorted");
            let start = Instant::now();
            for &k in &keys {
                tree.delete(k);
            }
            (n, start.elapsed().as_secs_f64())
        }
        "iterate" => {
            let tree = Tree::bulk_load(&keys).expect("bench input is sorted");
            let start = Instant::now();
            let count = tree.iter_from(i32::MIN).count();
            (count, start.elapsed().as_secs_f64())
        }
        other => {
            eprintln!("ERROR: unknown workload {other:?}");
            exit(1);
        }
    };

    let mops = if elapsed_sec > 0.0 {
        ops as f64 / elapsed_sec / 1e6
    } else {
        0.0
    };
    let ns_per_op = if ops > 0 {
        elapsed_sec * 1e9 / ops as f64
    } else {
        0.0
    };

    let record = BenchRecord {
        library: "matryoshka-index",
        workload: workload.to_string(),
        n,
        ops,
        elapsed_sec,
        mops,
        ns_per_op,
    };
    println!("{}", serde_json::to_string(&record).expect("record serializes"));
}

fn run_bulk(n: usize) {
    let keys: Vec<i32> = (0..n as i32).collect();
    let tree = match Tree::bulk_load(&keys) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("ERROR: bulk_load failed: {e}");
            exit(1);
        }
    };
    println!("size={} height={}", tree.len(), tree.height());
}

fn run_scenario(name: &str) {
    let passed = match name {
        "single_insert" => scenario_single_insert(),
        "ascending" => scenario_ascending(),
        "descending" => scenario_descending(),
        "predecessor" => scenario_predecessor(),
        "duplicate" => scenario_duplicate(),
        "delete_evens" => scenario_delete_evens(),
        "iteration" => scenario_iteration(),
        "lifecycle" => scenario_lifecycle(),
        other => {
            eprintln!("ERROR: unknown scenario {other:?}");
            exit(1);
        }
    };

    if passed {
        println!("PASS {name}");
    } else {
        println!("FAIL {name}");
        exit(1);
    }
}

fn scenario_single_insert() -> bool {
    let mut tree = Tree::create();
    tree.insert(42) && tree.len() == 1 && tree.contains(42) && !tree.contains(41)
}

fn scenario_ascending() -> bool {
    let mut tree = Tree::create();
    for i in 0..10_000 {
        if !tree.insert(i) {
            return false;
        }
    }
    (0..10_000).all(|i| tree.contains(i)) && tree.len() == 10_000
}

fn scenario_descending() -> bool {
    let mut tree = Tree::create();
    for i in (0..1000).rev() {
        tree.insert(i);
    }
    tree.len() == 1000 && (0..1000).all(|i| tree.contains(i))
}

fn scenario_predecessor() -> bool {
    let mut tree = Tree::create();
    for i in 0..100 {
        tree.insert(i * 10);
    }
    tree.search(55) == Some(50) && tree.search(-1).is_none()
}

fn scenario_duplicate() -> bool {
    let mut tree = Tree::create();
    tree.insert(42) && !tree.insert(42)
}

fn scenario_delete_evens() -> bool {
    let mut tree = Tree::create();
    for i in 0..200 {
        tree.insert(i);
    }
    for i in (0..200).step_by(2) {
        if !tree.delete(i) {
            return false;
        }
    }
    tree.len() == 100
}

fn scenario_iteration() -> bool {
    let mut tree = Tree::create();
    for i in 0..500 {
        tree.insert(i * 3);
    }
    let expected: Vec<i32> = (0..500).map(|i| i * 3).collect();
    tree.iter_from(i32::MIN).collect::<Vec<_>>() == expected
}

fn scenario_lifecycle() -> bool {
    let tree = Tree::create();
    tree.len() == 0 && tree.is_empty()
}
