use snownode::{Generator, Layout};

fn main() {
    // 12 node bits = 4096 nodes, 10 sequence bits = 1024 IDs per millisecond
    let layout = Layout::builder()
        .node_bits(12)
        .sequence_bits(10)
        .epoch(1_704_067_200_000) // 2024-01-01 UTC
        .build()
        .unwrap();

    let generator = Generator::with_layout(42, layout).unwrap();

    println!("Generator configuration:");
    println!("  Node bits: {}", layout.node_bits());
    println!("  Sequence bits: {}", layout.sequence_bits());
    println!("  Timestamp bits: {}", layout.timestamp_bits());
    println!("  Max node ID: {}", layout.max_node_id());
    println!("  Max sequence per ms: {}", layout.max_sequence());

    let id = generator.generate();
    let (ts, node, seq) = generator.decompose(id);

    println!("\nGenerated ID: {}", id);
    println!("Components:");
    println!("  Timestamp: {} ms since epoch", ts);
    println!("  Node ID: {} (of {})", node, layout.max_node_id());
    println!("  Sequence: {} (of {})", seq, layout.max_sequence());

    // A node id that does not fit the field is rejected up front
    match Generator::with_layout(5000, layout) {
        Ok(_) => unreachable!(),
        Err(err) => println!("\nNode 5000: {err}"),
    }
}
