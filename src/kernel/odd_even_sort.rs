// Odd-even transposition sort kernel (Rust/Rayon version)
//
// Usage:
//   ./odd_even_sort <N> <T> [affinity]
//   N:        number of elements (e.g., 10000)
//   T:        number of threads (e.g., 1,2,4,8,16)
//   affinity: 0 | 1 (1 = pin pool threads to cores)
//
// Output: elapsed sort time in seconds, nothing else, e.g.
//   0.123456
// Errors go to stderr with exit status 1.

use odd_even_scaling::sort;
use std::env;
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

// Next core to hand out when pinning
static THREAD_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn set_thread_affinity() {
    let thread_id = THREAD_COUNTER.fetch_add(1, Ordering::SeqCst);
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(&core) = core_ids.get(thread_id) {
            core_affinity::set_for_current(core);
        }
    }
}

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <N> <Threads> [affinity]", program);
    process::exit(1);
}

fn parse_positive(value: &str, what: &str, program: &str) -> usize {
    match value.parse::<usize>() {
        Ok(v) if v > 0 => v,
        _ => {
            eprintln!("Invalid {}: {}", what, value);
            usage(program);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("odd_even_sort");

    if args.len() < 3 {
        usage(program);
    }

    let n = parse_positive(&args[1], "problem size", program);
    let threads = parse_positive(&args[2], "thread count", program);
    let use_affinity = args.get(3).map_or(false, |a| a == "1");

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .start_handler(move |_| {
            if use_affinity {
                set_thread_affinity();
            }
        })
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to build thread pool: {}", e);
            process::exit(1);
        }
    };

    // Same numbers every run
    let mut data = sort::random_input(n, sort::SEED);

    let start = Instant::now();
    pool.install(|| sort::odd_even_sort(&mut data));
    let elapsed = start.elapsed().as_secs_f64();

    if !sort::is_sorted(&data) {
        eprintln!("FAIL: array not sorted (N={}, T={})", n, threads);
        process::exit(1);
    }

    // Full precision: a rounded 0.000000 would read as a zero-length run.
    println!("{}", elapsed);
}
