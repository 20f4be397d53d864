/// A frame-budgeted task loop built on the dispatcher.
///
/// Background threads post closures at irregular intervals while the main
/// thread runs a fixed number of "frames". Each frame executes queued tasks
/// until its time budget runs out, so a burst of postings cannot stall the
/// loop. Leftover tasks are drained after shutdown.
extern crate waitq_lib;

use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::Rng;
use waitq_lib::dispatch::Dispatcher;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of frames to run
    #[arg(short, long, default_value_t = 12)]
    frames: u32,
    /// Time budget per frame, in milliseconds
    #[arg(short = 'b', long, default_value_t = 25)]
    frame_ms: u64,
    /// Number of posting threads
    #[arg(short, long, default_value_t = 2)]
    producers: usize,
    /// Tasks each posting thread submits
    #[arg(short, long, default_value_t = 40)]
    tasks: u32,
}

fn main() {
    let args = Args::parse();
    let dispatcher = Dispatcher::new();

    let mut producers = Vec::new();
    for producer in 0..args.producers {
        let dispatcher = dispatcher.clone();
        let tasks = args.tasks;
        producers.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            for task in 0..tasks {
                dispatcher.post(move || {
                    println!("  ran task {} from producer {}", task, producer);
                });
                thread::sleep(Duration::from_millis(rng.gen_range(1..10)));
            }
        }));
    }

    let budget = Duration::from_millis(args.frame_ms);
    for frame in 0..args.frames {
        let deadline = Instant::now() + budget;
        let mut ran = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !dispatcher.run_one_for(remaining) {
                break;
            }
            ran += 1;
        }
        println!("frame {:>2}: {} tasks, {} pending", frame, ran, dispatcher.pending());
    }

    for handle in producers {
        handle.join().unwrap();
    }
    dispatcher.shutdown();
    let leftover = dispatcher.drain();
    println!("drained {} tasks after shutdown", leftover);
}
