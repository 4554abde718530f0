use rand::{rng, Rng};
use snownode::{iface, Generator, Iface, Layout, ListMode};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    match iface::list_ifaces(ListMode::All) {
        Ok(ifaces) => {
            println!("Host interfaces:");
            for Iface { ip, name } in ifaces {
                println!("  {name}: {ip}");
            }
        }
        Err(err) => println!("Could not list interfaces: {err}"),
    }

    // Node id from the host's primary IPv4 address
    let generator = Arc::new(Generator::from_host(Layout::host_octet(), "").unwrap());
    println!(
        "\nNode id {} from {}",
        generator.node_id(),
        generator.node_source()
    );

    let mut handles = vec![];
    for thread_id in 0..4 {
        let generator = Arc::clone(&generator);
        handles.push(thread::spawn(move || {
            let mut ids = HashSet::new();
            let mut rng = rng();

            for i in 0..5 {
                let id = generator.generate();
                let (ts, node, seq) = generator.decompose(id);
                println!(
                    "Thread {} generated ID {} (ts={}, node={}, seq={})",
                    thread_id, i, ts, node, seq
                );

                assert!(ids.insert(id), "Duplicate ID generated!");

                let delay = rng.random_range(0..=9);
                thread::sleep(Duration::from_millis(delay));
            }
            ids
        }));
    }

    let mut all_ids = HashSet::new();
    for handle in handles {
        all_ids.extend(handle.join().unwrap());
    }

    println!("\nTotal unique IDs generated: {}", all_ids.len());

    let mut ids: Vec<_> = all_ids.into_iter().collect();
    ids.sort_unstable();
    for i in 1..ids.len() {
        assert!(ids[i] > ids[i - 1], "IDs not monotonically increasing!");
    }
    println!("All IDs are unique and monotonically increasing!");
}
