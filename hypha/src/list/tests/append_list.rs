use super::*;

#[test]
fn append_list_to_empty() {
    let _trace = trace_init();

    let mut a = entry(1);
    let mut b = entry(2);
    let b_ptr = ptr(&b);

    let mut list = List::new();
    let mut other = List::new();
    other.append(a.as_mut());
    other.append(b.as_mut());

    list.append_list(&mut other);
    list.assert_valid();
    other.assert_valid();

    assert_eq!(collect_vals(&list), vec![1, 2]);
    assert_eq!(list.len(), 2);
    assert_ptr_eq!(b_ptr, list.tail());

    assert!(other.is_empty());
    assert_eq!(other.len(), 0);
}

#[test]
fn append_empty_list() {
    let _trace = trace_init();

    let mut a = entry(1);
    let a_ptr = ptr(&a);

    let mut list = List::new();
    let mut other = List::new();
    list.append(a.as_mut());

    list.append_list(&mut other);
    list.assert_valid();

    assert_eq!(collect_vals(&list), vec![1]);
    assert_ptr_eq!(a_ptr, list.head());
    assert_ptr_eq!(a_ptr, list.tail());
    assert!(other.is_empty());
}

#[test]
fn append_list_links_tail() {
    let _trace = trace_init();

    let mut entries = (1..=6).map(entry).collect::<Vec<_>>();
    let mut seven = entry(7);
    let last = ptr(&entries[5]);
    let mut nodes = entries.iter_mut().map(|entry| entry.as_mut());

    let mut list = List::new();
    let mut other = List::new();
    list.extend(nodes.by_ref().take(3));
    other.extend(nodes);

    list.append_list(&mut other);
    list.assert_valid();
    assert_eq!(collect_vals(&list), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(list.len(), 6);
    assert_ptr_eq!(last, list.tail());

    // the emptied list can keep growing independently
    other.append(seven.as_mut());
    other.assert_valid();
    list.assert_valid();
    assert_eq!(collect_vals(&other), vec![7]);
    assert_eq!(collect_vals(&list), vec![1, 2, 3, 4, 5, 6]);
}
