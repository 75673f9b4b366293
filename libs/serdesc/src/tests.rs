use psbt_map::{Entry, ErrorKind, ExtendedKey, Field, Location, MapPos, write_map};

use super::*;

fn wallet() -> OutputDescriptor {
    OutputDescriptor {
        name: "wallet".to_owned(),
        descriptor: "wpkh([12345678/0h/1]xpub.../0/*)".to_owned(),
        keys: vec![ExtendedKey {
            master_fingerprint: 0x1234_5678,
            path: vec![0x8000_0000, 1],
            key: (0u8..33).collect(),
        }],
    }
}

fn build(maps: &[&[Entry<'_>]]) -> Vec<u8> {
    let mut buf = MAGIC.to_vec();
    for map in maps {
        write_map(&mut buf, *map).expect("writing to vec cannot fail");
    }
    buf
}

#[test]
fn round_trip() {
    let desc = wallet();
    let buf = to_vec(&desc).expect("writing to vec cannot fail");
    let rev = from_slice(&buf).expect("must decode");
    assert_eq!(desc, rev, "serialization messed up data");
}

#[test]
fn round_trip_empty() {
    let desc = OutputDescriptor::default();
    let buf = to_vec(&desc).expect("writing to vec cannot fail");
    assert_eq!(
        buf,
        b"desc\xff\x01\x01\x00\x01\x00\x00\x00",
        "empty fields are still written"
    );
    assert_eq!(
        hex::encode(&buf),
        "64657363ff01010001000000",
        "hex form of an empty descriptor"
    );

    let rev = from_slice(&buf).expect("must decode");
    assert_eq!(desc, rev, "serialization messed up data");
}

#[test]
fn wire_layout() {
    let buf = to_vec(&wallet()).expect("writing to vec cannot fail");

    let mut expected = b"desc\xff".to_vec();
    // global map: name first, then the descriptor
    expected.extend_from_slice(b"\x01\x01\x06wallet");
    expected.extend_from_slice(b"\x01\x00\x20wpkh([12345678/0h/1]xpub.../0/*)");
    expected.push(0x00);
    // key record
    expected.push(34);
    expected.push(KEY_XPUB);
    expected.extend(0u8..33);
    expected.push(12);
    expected.extend_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    expected.extend_from_slice(&[0x00, 0x00, 0x00, 0x80]);
    expected.extend_from_slice(&[0x01, 0x00, 0x00, 0x00]);
    expected.push(0x00);

    assert_eq!(buf, expected, "unexpected encoding");
}

#[test]
fn malformed_magic() {
    let mut buf = to_vec(&wallet()).expect("writing to vec cannot fail");
    buf[0] = b'D';

    let err = from_slice(&buf).expect_err("bad magic");
    assert_eq!(err.kind(), ErrorKind::MalformedMagic, "expected malformed magic");

    let err = from_slice(b"psbt\xff\x00").expect_err("psbt is not a descriptor");
    assert_eq!(err.kind(), ErrorKind::MalformedMagic, "expected malformed magic");
}

#[test]
fn corrupted_map() {
    let mut buf = MAGIC.to_vec();
    buf.extend_from_slice(&[0x05, 0x01]);

    let err = from_slice(&buf).expect_err("bad global map");
    assert_eq!(err.kind(), ErrorKind::TruncatedEntry, "expected truncated entry");
    assert_eq!(err.location().map, Some(MapPos::Global), "expected global map");
}

#[test]
fn truncated_key_record() {
    let mut buf = to_vec(&wallet()).expect("writing to vec cannot fail");
    buf.truncate(buf.len() - 3);

    let err = from_slice(&buf).expect_err("key record cut off");
    assert_eq!(err.kind(), ErrorKind::TruncatedEntry, "expected truncated entry");
    assert_eq!(
        err.location(),
        Location {
            map: Some(MapPos::Section(0)),
            entry: Some(0),
        },
        "expected first key record"
    );
}

#[test]
fn missing_fields_are_empty() {
    let buf = build(&[&[]]);
    let desc = from_slice(&buf).expect("must decode");
    assert_eq!(desc, OutputDescriptor::default(), "expected empty descriptor");

    let buf = build(&[&[Entry::new(&[GLOBAL_OUTPUT_DESCRIPTOR], b"tr(...)")]]);
    let desc = from_slice(&buf).expect("must decode");
    assert_eq!(desc.name, "", "name is missing");
    assert_eq!(desc.descriptor, "tr(...)", "descriptor is present");
}

#[test]
fn last_duplicate_wins() {
    let buf = build(&[&[
        Entry::new(&[GLOBAL_NAME], b"first"),
        Entry::new(&[GLOBAL_NAME], b"second"),
    ]]);
    let desc = from_slice(&buf).expect("must decode");
    assert_eq!(desc.name, "second", "last name must win");
}

#[test]
fn invalid_utf8_name() {
    let buf = build(&[&[
        Entry::new(&[GLOBAL_OUTPUT_DESCRIPTOR], b"wpkh(...)"),
        Entry::new(&[GLOBAL_NAME], &[0xc3, 0x28]),
    ]]);
    let err = from_slice(&buf).expect_err("name is not utf-8");
    assert_eq!(err.kind(), ErrorKind::InvalidUtf8, "expected invalid utf-8");
    assert_eq!(
        err.location(),
        Location {
            map: Some(MapPos::Global),
            entry: Some(1),
        },
        "expected second global entry"
    );
}

#[test]
fn unknown_global_field_is_reported() {
    let buf = build(&[&[Entry::new(&[0x07], b"future"), Entry::new(&[GLOBAL_NAME], b"w")]]);

    let mut fields = Vec::new();
    let desc = Decoder::new().decode(&buf, &mut fields).expect("must decode");
    assert_eq!(desc.name, "w", "known fields still decode");
    assert_eq!(
        fields,
        [(MapPos::Global, Field::Unknown(Entry::new(&[0x07], b"future")))],
        "unknown field must be reported"
    );
}

#[test]
fn unknown_key_record_field() {
    let value = [0x00, 0x00, 0x00, 0x01];
    let buf = build(&[
        &[],
        &[Entry::new(&[0x09, 0xaa], &[0x01])],
        &[Entry::new(&[KEY_XPUB, 0xbb], &value)],
    ]);

    // skipping never produces a placeholder key
    let mut fields = Vec::new();
    let desc = Decoder::new()
        .unknown_keys(UnknownKeyPolicy::Skip)
        .decode(&buf, &mut fields)
        .expect("unknown fields are skipped");
    assert_eq!(
        desc.keys,
        [ExtendedKey {
            master_fingerprint: 1,
            path: Vec::new(),
            key: vec![0xbb],
        }],
        "only the known key is decoded"
    );
    assert_eq!(
        fields,
        [(MapPos::Section(0), Field::Unknown(Entry::new(&[0x09, 0xaa], &[0x01])))],
        "skipped field must be reported"
    );

    let err = Decoder::new()
        .unknown_keys(UnknownKeyPolicy::Reject)
        .decode(&buf, &mut psbt_map::Ignore)
        .expect_err("unknown fields are rejected");
    assert_eq!(
        err.kind(),
        ErrorKind::UnknownFieldType { key_type: 0x09 },
        "expected unknown field type"
    );
    assert_eq!(err.location().map, Some(MapPos::Section(0)), "expected first record");
}

#[test]
fn invalid_key_value() {
    let buf = build(&[&[], &[Entry::new(&[KEY_XPUB], &[0x00; 6])]]);
    let err = from_slice(&buf).expect_err("6 bytes is not a valid key value");
    assert_eq!(
        err.kind(),
        ErrorKind::InvalidExtendedKeyValue { len: 6 },
        "expected invalid key value"
    );
    assert_eq!(
        err.location(),
        Location {
            map: Some(MapPos::Section(0)),
            entry: Some(0),
        },
        "expected first key record"
    );
}

#[test]
fn multiple_keys_per_record() {
    let a = [0x00, 0x00, 0x00, 0x0a];
    let b = [0x00, 0x00, 0x00, 0x0b, 0x05, 0x00, 0x00, 0x00];
    let buf = build(&[
        &[],
        &[Entry::new(&[KEY_XPUB, 0x01], &a), Entry::new(&[KEY_XPUB, 0x02], &b)],
        &[],
    ]);

    let desc = from_slice(&buf).expect("must decode");
    let fingerprints: Vec<u32> = desc.keys.iter().map(|k| k.master_fingerprint).collect();
    assert_eq!(fingerprints, [0x0a, 0x0b], "every key entry is kept in order");
    assert_eq!(desc.keys[1].path, [5], "path of second key");
}
