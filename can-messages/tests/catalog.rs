// End-to-end checks on the full message catalog
use can_messages::{
    catalog, codec, compose_id, dbc, CompositionError, DatabaseBuilder, DatabaseError, Message,
    Module, Node, ProtocolTemplate, Signal, SignalValue,
};
use std::collections::HashSet;

#[test]
fn catalog_database_is_unique() {
    let db = catalog::builder().unwrap().build().unwrap();

    let ids: HashSet<u32> = db.iter().map(|m| m.frame_id()).collect();
    let names: HashSet<&str> = db.iter().map(|m| m.name()).collect();
    assert_eq!(ids.len(), db.len());
    assert_eq!(names.len(), db.len());

    for message in &db {
        let signals = message.signals();
        for (i, a) in signals.iter().enumerate() {
            for b in &signals[i + 1..] {
                assert!(!a.overlaps(b), "{}: {} / {}", message.name(), a.name(), b.name());
            }
        }
    }
}

#[test]
fn literal_examples_hold() {
    let db = catalog::builder().unwrap().build().unwrap();

    let get_pos = db.get_message_by_name("konarm_2_get_pos").unwrap();
    assert_eq!(get_pos.frame_id(), 0x623);

    let id = compose_id(5, 0x1310).unwrap();
    assert_eq!(id, 0x0A00_1310);
    assert_eq!(id >> 25, 5);
    assert_eq!(id & ((1 << 25) - 1), 0x1310);
    assert_eq!(
        db.get_message(id).unwrap().name(),
        "modu_card_suspension_software_version"
    );
}

#[test]
fn colliding_subsystem_is_rejected() {
    let mut builder = catalog::builder().unwrap();
    let rogue = Message::builder(0x623, "gps_position")
        .senders([Module::SensorBoard])
        .receivers([Module::Jetson])
        .build()
        .unwrap();
    builder.add_module(vec![rogue]);

    assert_eq!(
        builder.build().unwrap_err(),
        DatabaseError::DuplicateFrameId {
            first: "konarm_2_get_pos".to_string(),
            second: "gps_position".to_string(),
            frame_id: 0x623,
        }
    );
}

#[test]
fn overlapping_node_offsets_fail_expansion() {
    let templates = catalog::konarm::templates().unwrap();
    let protocol =
        ProtocolTemplate::new("konarm", catalog::konarm::NODE_FIELD, templates).unwrap();
    let err = protocol
        .expand(&[Node::new(0x610, "1"), Node::new(0x608, "bad")])
        .unwrap_err();
    assert!(matches!(err, CompositionError::OffsetOutsideField { .. }));
}

#[test]
fn generated_dbc_parses() {
    let db = catalog::builder().unwrap().build().unwrap();
    let text = dbc::write_dbc(&db).unwrap();

    let parsed = can_dbc::DBC::from_slice(text.as_bytes()).unwrap();
    assert_eq!(parsed.messages().len(), db.len());

    for (ours, theirs) in db.iter().zip(parsed.messages()) {
        assert_eq!(theirs.message_name(), ours.name());
        assert_eq!(theirs.message_id().0 & 0x1FFF_FFFF, ours.frame_id());
        assert_eq!(theirs.signals().len(), ours.signals().len());
    }
}

#[test]
fn status_payload_decodes_through_catalog() {
    let db = catalog::builder().unwrap().build().unwrap();
    let heartbeat = db.get_message_by_name("modu_card_base_heartbeat_1").unwrap();

    let payload = codec::encode_payload(heartbeat, &[("uid", 77.0), ("status", 3.0)]).unwrap();
    let decoded = codec::decode_payload(heartbeat, &payload).unwrap();
    assert_eq!(decoded[0].value, SignalValue::Integer(77));
    assert_eq!(decoded[1].value.label(), Some("warning"));
}

#[test]
fn payload_boundary() {
    assert!(Signal::unsigned("last", 60, 4).is_ok());
    assert!(Signal::unsigned("past", 60, 5).is_err());

    let mut builder = DatabaseBuilder::new();
    builder.add_module(vec![Message::builder(0x10, "full")
        .senders([Module::Gpio])
        .receivers([Module::Jetson])
        .signals([
            Signal::unsigned("low", 0, 32).unwrap(),
            Signal::unsigned("high", 32, 32).unwrap(),
        ])
        .build()
        .unwrap()]);
    assert_eq!(builder.build().unwrap().stats().num_signals, 2);
}
