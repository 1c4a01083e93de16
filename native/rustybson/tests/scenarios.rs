//! End-to-end document scenarios

use rustybson::core::codec;
use rustybson::{Document, DocumentOptions, ElementType, InvalidOp, Value};

fn build(doc: &mut Document, outer: &str, c: i32, with_a: bool) {
    let root = doc.root();
    if with_a {
        let a = doc.make_leaf("a", 1).unwrap();
        doc.push_back(root, a).unwrap();
    }
    let b = doc.make_object(outer).unwrap();
    let leaf = doc.make_leaf("c", c).unwrap();
    doc.push_back(b, leaf).unwrap();
    doc.push_back(root, b).unwrap();
}

#[test]
fn test_edit_then_serialize_matches_direct_build() {
    let mut edited = Document::new();
    build(&mut edited, "b", 2, true);
    let root = edited.root();

    let a = edited.find_child(root, "a").unwrap().unwrap();
    edited.remove(a).unwrap();
    let b = edited.find_child(root, "b").unwrap().unwrap();
    edited.rename(b, "x").unwrap();
    let c = edited.find_child(b, "c").unwrap().unwrap();
    edited.set_value(c, 3).unwrap();

    let mut direct = Document::new();
    build(&mut direct, "x", 3, false);

    assert_eq!(edited.serialize().unwrap(), direct.serialize().unwrap());
    assert_eq!(
        edited.to_debug_string(edited.root()).unwrap(),
        "{ x: { c: 3 } }"
    );
}

#[test]
fn test_same_edits_on_wrapped_bytes() {
    let mut source = Document::new();
    build(&mut source, "b", 2, true);
    let mut doc = Document::from_bytes(source.serialize().unwrap()).unwrap();
    let root = doc.root();

    let a = doc.find_child(root, "a").unwrap().unwrap();
    doc.remove(a).unwrap();
    let b = doc.find_child(root, "b").unwrap().unwrap();
    doc.rename(b, "x").unwrap();
    let c = doc.find_child(b, "c").unwrap().unwrap();
    doc.set_value(c, 3).unwrap();

    let mut direct = Document::new();
    build(&mut direct, "x", 3, false);
    assert_eq!(doc.serialize().unwrap(), direct.serialize().unwrap());
}

#[test]
fn test_read_single_field_of_opaque_root() {
    let bytes = codec::encode_document([
        ("p", &Value::Int32(1)),
        ("q", &Value::Int32(2)),
        ("r", &Value::Int32(3)),
    ])
    .unwrap();
    let mut doc = Document::from_bytes(bytes.clone()).unwrap();
    let root = doc.root();
    assert!(!doc.is_expanded(root));

    let q = doc.find_child(root, "q").unwrap().unwrap();
    assert!(doc.is_expanded(root));
    assert_eq!(doc.value(q).unwrap(), Some(Value::Int32(2)));
    assert_eq!(doc.serialize().unwrap(), bytes);
}

#[test]
fn test_verbatim_and_reencode_are_equivalent() {
    let mut source = Document::new();
    build(&mut source, "b", 2, true);
    let root = source.root();
    let tags = source.make_array("tags").unwrap();
    for tag in ["red", "blue"] {
        let leaf = source.make_leaf("t", tag).unwrap();
        source.push_back(tags, leaf).unwrap();
    }
    source.push_back(root, tags).unwrap();
    let bytes = source.serialize().unwrap();

    let mut verbatim = Document::from_bytes(bytes.clone()).unwrap();
    let mut reencode = Document::from_bytes_with_options(
        bytes,
        DocumentOptions::new().with_verbatim_opaque(false),
    )
    .unwrap();

    // Expand one level on both; deeper containers stay opaque
    for doc in [&mut verbatim, &mut reencode] {
        let root = doc.root();
        doc.materialize(root).unwrap();
    }
    assert_eq!(verbatim.serialize().unwrap(), reencode.serialize().unwrap());
    assert!(verbatim
        .equivalent(verbatim.root(), &reencode, reencode.root())
        .unwrap());
}

#[test]
fn test_import_between_documents() {
    let mut source = Document::new();
    build(&mut source, "b", 2, true);
    let root = source.root();
    let b = source.find_child(root, "b").unwrap().unwrap();

    let mut target = Document::new();
    let copy = target.import(&source, b).unwrap();
    assert!(target.is_opaque(copy));
    assert_eq!(target.element_type(copy), ElementType::Object);

    let troot = target.root();
    target.push_back(troot, copy).unwrap();
    let c = target.find_child(copy, "c").unwrap().unwrap();
    assert_eq!(target.value(c).unwrap(), Some(Value::Int32(2)));

    // Handles are bound to the document that issued them
    let err = target.push_back(troot, b).unwrap_err();
    assert_eq!(err.invalid_op(), Some(InvalidOp::ForeignElement));
}

#[test]
fn test_rejections_leave_tree_intact() {
    let mut doc = Document::new();
    build(&mut doc, "b", 2, true);
    let root = doc.root();
    let before = doc.serialize().unwrap();

    let a = doc.find_child(root, "a").unwrap().unwrap();
    let b = doc.find_child(root, "b").unwrap().unwrap();
    let orphan = doc.make_leaf("o", Value::Null).unwrap();

    let cases = [
        (doc.push_back(a, orphan), InvalidOp::NotAContainer),
        (doc.push_back(root, b), InvalidOp::AlreadyAttached),
        (doc.push_back(b, root), InvalidOp::RootElement),
        (doc.remove(root), InvalidOp::RootElement),
        (doc.remove(orphan), InvalidOp::Detached),
        (doc.insert_before(orphan, a), InvalidOp::Detached),
        (doc.rename(root, "r"), InvalidOp::RootElement),
        (doc.rename(a, "bad\0name"), InvalidOp::InvalidName),
        (doc.set_value(b, 1), InvalidOp::NotALeaf),
    ];
    for (result, expected) in cases {
        assert_eq!(result.unwrap_err().invalid_op(), Some(expected));
    }
    assert_eq!(doc.serialize().unwrap(), before);
}

#[test]
fn test_pop_and_reattach() {
    let mut doc = Document::new();
    let root = doc.root();
    for name in ["first", "middle", "last"] {
        let leaf = doc.make_leaf(name, true).unwrap();
        doc.push_back(root, leaf).unwrap();
    }
    let last = doc.pop_back(root).unwrap().unwrap();
    let first = doc.pop_front(root).unwrap().unwrap();
    assert_eq!(doc.count_children(root).unwrap(), 1);
    assert!(!doc.is_attached(first));

    doc.push_front(root, last).unwrap();
    let middle = doc.last_child(root).unwrap().unwrap();
    doc.insert_after(middle, first).unwrap();

    let order: Vec<String> = {
        let children = doc.children(root).unwrap();
        let d = children.document();
        children.map(|c| d.name(c).to_string()).collect()
    };
    assert_eq!(order, ["last", "middle", "first"]);
}

#[test]
fn test_set_value_from_shares_bytes() {
    let mut doc = Document::new();
    let a = doc.make_leaf("a", "shared text").unwrap();
    let b = doc.make_leaf("b", 0).unwrap();
    let before = doc.stats().value_bytes;
    doc.set_value_from(b, a).unwrap();
    assert_eq!(doc.stats().value_bytes, before);
    assert_eq!(doc.element_type(b), ElementType::String);
    assert_eq!(doc.value(b).unwrap(), Some(Value::from("shared text")));
    assert_eq!(doc.name(b), "b");
}

fn repeated_leaves(doc: &mut Document) {
    let root = doc.root();
    let list = doc.make_array("list").unwrap();
    for _ in 0..3 {
        let leaf = doc.make_leaf("n", "same").unwrap();
        doc.push_back(list, leaf).unwrap();
    }
    doc.push_back(root, list).unwrap();
    let tail = doc.make_leaf("n", "same").unwrap();
    doc.push_back(root, tail).unwrap();
}

#[test]
fn test_name_dedup_off() {
    let mut shared = Document::new();
    repeated_leaves(&mut shared);
    let mut copied = Document::with_options(DocumentOptions::new().with_dedup_names(false));
    repeated_leaves(&mut copied);

    assert_eq!(copied.serialize().unwrap(), shared.serialize().unwrap());
    assert_eq!(copied.stats().names, shared.stats().names + 3);
    assert!(copied.stats().name_bytes > shared.stats().name_bytes);

    // Names decoded from wrapped bytes take the copy path as well
    let bytes = shared.serialize().unwrap();
    let mut wrapped = Document::from_bytes_with_options(
        bytes.clone(),
        DocumentOptions::new().with_dedup_names(false),
    )
    .unwrap();
    let root = wrapped.root();
    wrapped.materialize_all(root).unwrap();
    assert_eq!(wrapped.stats().reachable_reps, 6);
    assert_eq!(wrapped.serialize().unwrap(), bytes);
}

#[test]
fn test_value_dedup_on() {
    let mut plain = Document::new();
    repeated_leaves(&mut plain);
    let mut deduped = Document::with_options(DocumentOptions::new().with_dedup_values(true));
    repeated_leaves(&mut deduped);

    assert_eq!(deduped.serialize().unwrap(), plain.serialize().unwrap());
    let one = codec::encode_document([("n", &Value::from("same"))]).unwrap();
    // Encoded string: length prefix, "same", terminator
    assert_eq!(deduped.stats().value_bytes, 4 + 5);
    assert_eq!(plain.stats().value_bytes, 4 * (4 + 5));

    // Overwriting one shared value leaves the others intact
    let root = deduped.root();
    let tail = deduped.last_child(root).unwrap().unwrap();
    deduped.set_value(tail, 1).unwrap();
    let list = deduped.first_child(root).unwrap().unwrap();
    let first = deduped.first_child(list).unwrap().unwrap();
    assert_eq!(deduped.value(first).unwrap(), Some(Value::from("same")));
    assert_eq!(deduped.value(tail).unwrap(), Some(Value::Int32(1)));

    let mut single = Document::with_options(DocumentOptions::new().with_dedup_values(true));
    let root = single.root();
    let n = single.make_leaf("n", "same").unwrap();
    single.push_back(root, n).unwrap();
    assert_eq!(single.serialize().unwrap(), one);
}

#[test]
fn test_depth_through_nesting() {
    let mut doc = Document::new();
    let root = doc.root();
    assert_eq!(doc.depth(root), Some(0));

    let mut parent = root;
    let mut chain = Vec::new();
    for level in 0..8 {
        let child = if level % 2 == 0 {
            doc.make_object("o").unwrap()
        } else {
            doc.make_array("a").unwrap()
        };
        doc.push_back(parent, child).unwrap();
        chain.push(child);
        parent = child;
    }
    for (i, &el) in chain.iter().enumerate() {
        assert_eq!(doc.depth(el), Some(i + 1));
    }

    let middle = chain[3];
    doc.remove(middle).unwrap();
    assert_eq!(doc.depth(middle), None);
    assert_eq!(doc.depth(chain[7]), None);
    assert_eq!(doc.depth(chain[2]), Some(3));

    // Depth survives a round trip through bytes
    let mut wrapped = Document::from_bytes(doc.serialize().unwrap()).unwrap();
    let mut el = wrapped.root();
    for expected in 1..=3 {
        el = wrapped.first_child(el).unwrap().unwrap();
        assert_eq!(wrapped.depth(el), Some(expected));
    }
    assert_eq!(wrapped.first_child(el).unwrap(), None);
}

#[test]
fn test_foreign_handles_on_reads() {
    let mut source = Document::new();
    build(&mut source, "b", 2, true);
    let root = source.root();
    let a = source.find_child(root, "a").unwrap().unwrap();

    let other = Document::new();
    assert_eq!(other.parent(a), None);
    assert_eq!(other.next_sibling(a), None);
    assert_eq!(other.prev_sibling(a), None);
    assert_eq!(other.value_bytes(a), None);
    assert_eq!(other.depth(a), None);
    assert!(!other.is_attached(a));
    assert!(!other.is_root(a));
    assert_eq!(
        other.value(a).unwrap_err().invalid_op(),
        Some(InvalidOp::ForeignElement)
    );
    assert_eq!(source.value(a).unwrap(), Some(Value::Int32(1)));
}

#[test]
#[should_panic(expected = "element from another document")]
fn test_foreign_name_panics() {
    let mut source = Document::new();
    let leaf = source.make_leaf("a", 1).unwrap();
    let other = Document::new();
    let _ = other.name(leaf);
}

#[test]
fn test_legacy_types_pass_through() {
    let scope = codec::encode_document([("y", &Value::Int32(2))]).unwrap();
    let pointer = Value::DbPointer {
        namespace: "db.coll".into(),
        id: [7; 12],
    };
    let code = Value::JavaScriptWithScope {
        code: "return y".into(),
        scope,
    };
    let bytes = codec::encode_document([("p", &pointer), ("s", &code)]).unwrap();

    let mut doc = Document::from_bytes_with_options(
        bytes.clone(),
        DocumentOptions::new().with_verbatim_opaque(false),
    )
    .unwrap();
    assert_eq!(doc.serialize().unwrap(), bytes);

    let root = doc.root();
    let p = doc.find_child(root, "p").unwrap().unwrap();
    let s = doc.find_child(root, "s").unwrap().unwrap();
    assert_eq!(doc.element_type(p), ElementType::DbPointer);
    assert_eq!(doc.value(p).unwrap(), Some(pointer));
    assert_eq!(doc.value(s).unwrap(), Some(code));
    assert_eq!(doc.serialize().unwrap(), bytes);
}
