use super::*;

#[test]
fn test_push_preserves_order() {
    let mut queue = CommandQueue::new();
    for command in moves("RDLU") {
        queue.push(command);
    }
    assert_eq!(queue.as_slice(), moves("RDLU").as_slice());
}

#[test]
fn test_remove_at_keeps_relative_order() {
    let mut queue: CommandQueue = moves("RDLU").into_iter().collect();
    assert_eq!(queue.remove_at(1), Some(Direction::Down));
    assert_eq!(queue.as_slice(), moves("RLU").as_slice());
}

#[test]
fn test_remove_at_out_of_range_is_noop() {
    let mut queue: CommandQueue = moves("RR").into_iter().collect();
    assert_eq!(queue.remove_at(2), None);
    assert_eq!(queue.len(), 2);
}

#[test]
fn test_pop_on_empty_queue() {
    let mut queue = CommandQueue::new();
    assert_eq!(queue.pop(), None);
    assert!(queue.is_empty());
}

#[test]
fn test_snapshot_is_detached() {
    let mut queue: CommandQueue = moves("RR").into_iter().collect();
    let snapshot = queue.snapshot();
    queue.clear();
    assert_eq!(snapshot, moves("RR"));
    assert!(queue.is_empty());
}

#[test]
fn test_queue_serializes_as_plain_list() {
    let queue: CommandQueue = moves("UR").into_iter().collect();
    let json = serde_json::to_string(&queue).unwrap();
    assert_eq!(json, r#"["UP","RIGHT"]"#);
}
