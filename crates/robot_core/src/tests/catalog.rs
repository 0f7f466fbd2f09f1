use super::*;

#[test]
fn test_next_after_follows_list_order() {
    let catalog = base_catalog();
    let first = catalog.first().unwrap();
    let second = catalog.next_after(&first.id).unwrap();
    assert_eq!(second.id, LevelId::new("2"));
    let third = catalog.next_after(&second.id).unwrap();
    assert_eq!(third.id, LevelId::new("3"));
    assert!(catalog.next_after(&third.id).is_none());
}

#[test]
fn test_unknown_id_has_no_successor() {
    let catalog = base_catalog();
    assert!(catalog.get(&LevelId::new("generated-x")).is_none());
    assert!(catalog.next_after(&LevelId::new("generated-x")).is_none());
}

#[test]
fn test_duplicate_id_resolves_to_first() {
    let mut copy = wall_level();
    copy.id = first_steps_level().id;
    let catalog = LevelCatalog::new(vec![first_steps_level(), copy]);
    assert_eq!(
        catalog.get(&LevelId::new("1")).unwrap().name,
        first_steps_level().name
    );
    assert_eq!(catalog.len(), 2);
}
