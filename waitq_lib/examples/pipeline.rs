/// A multi-producer measurement pipeline over a shared blocking queue.
///
/// Producer threads serialize readings to JSON and push them; a consumer
/// thread blocks on the queue and prints each reading colored by its source.
/// Shutdown is cooperative: once the producers are done, the main thread
/// cancels the queue, the consumer returns, and any readings it had not
/// reached yet are drained without blocking.
extern crate waitq_lib;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use rand::Rng;
use serde::{Deserialize, Serialize};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use waitq_lib::queue::{BlockingQueue, Outcome};

#[derive(Serialize, Deserialize, Debug)]
struct Reading {
    source: usize,
    sequence: u64,
    value: f64,
}

const PALETTE: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

fn print_reading(reading: &Reading) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    stdout
        .set_color(ColorSpec::new().set_fg(Some(PALETTE[reading.source % PALETTE.len()])))
        .unwrap();
    write!(&mut stdout, "source {}", reading.source).unwrap();
    stdout.reset().unwrap();
    println!(" #{}: {:.3}", reading.sequence, reading.value);
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of producer threads
    #[arg(short, long, default_value_t = 3)]
    producers: usize,
    /// Readings each producer emits
    #[arg(short, long, default_value_t = 8)]
    readings: u64,
}

fn main() {
    let args = Args::parse();
    let queue = Arc::new(BlockingQueue::<String>::new());

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let mut consumed = 0;
            loop {
                match queue.wait() {
                    Outcome::Item(line) => {
                        let reading: Reading = serde_json::from_str(&line).unwrap();
                        print_reading(&reading);
                        consumed += 1;
                    }
                    Outcome::Canceled => return consumed,
                    Outcome::TimedOut => unreachable!(),
                }
            }
        })
    };

    let mut producers = Vec::new();
    for source in 0..args.producers {
        let queue = Arc::clone(&queue);
        let readings = args.readings;
        producers.push(thread::spawn(move || {
            let mut rng = rand::thread_rng();
            for sequence in 0..readings {
                let reading = Reading {
                    source,
                    sequence,
                    value: rng.gen_range(-1.0..1.0),
                };
                queue.push(serde_json::to_string(&reading).unwrap());
                thread::sleep(Duration::from_millis(rng.gen_range(5..30)));
            }
        }));
    }
    for handle in producers {
        handle.join().unwrap();
    }

    // Everything is pushed; release the consumer. It stops at the
    // cancellation even if readings are still queued, and those stay
    // retrievable below.
    queue.cancel();
    let consumed = consumer.join().unwrap();

    let mut leftover = 0;
    while let Outcome::Item(line) = queue.try_pop() {
        let reading: Reading = serde_json::from_str(&line).unwrap();
        print_reading(&reading);
        leftover += 1;
    }

    println!(
        "{} readings consumed live, {} drained after cancellation",
        consumed, leftover
    );
    assert_eq!(
        consumed + leftover,
        args.producers as u64 * args.readings,
        "every reading is accounted for"
    );
}
