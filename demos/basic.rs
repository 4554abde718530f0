use snownode::{Generator, Id};

fn main() {
    // Create a generator with node ID 1
    let generator = Generator::new(1).unwrap();

    let id1 = generator.generate();
    let id2 = generator.generate();
    let id3 = generator.generate();

    println!("Generated IDs (guaranteed to be monotonic):");
    for id in [id1, id2, id3] {
        print_id(id, &generator);
    }

    // Or extract components individually
    println!("\nComponents of ID2 (extracted individually):");
    println!("  Unix time: {} ms", generator.time_of(id2));
    println!("  Node ID: {}", generator.node_id_of(id2));
    println!("  Sequence: {}", generator.step_of(id2));

    // The process-wide generator resolves its node id from the host
    let id = snownode::next();
    println!(
        "\nDefault generator: node {} ({}), ID {id}",
        snownode::global::node_id(),
        snownode::global::node_source()
    );
}

fn print_id(id: Id, generator: &Generator) {
    let (since_epoch, node, sequence) = generator.decompose(id);
    let datetime = generator.codec().datetime_of(id).unwrap();

    println!("  ID: {id}, Offset: {since_epoch}, Human date: {datetime}, Node ID: {node}, Sequence: {sequence}");
}
