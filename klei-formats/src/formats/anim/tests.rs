//! Tests for the ANIM format

use super::*;
use crate::error::FormatError;

struct Bytes(Vec<u8>);

impl Bytes {
    fn u8(&mut self, v: u8) -> &mut Self {
        self.0.push(v);
        self
    }
    fn u32(&mut self, v: u32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn f32(&mut self, v: f32) -> &mut Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn str(&mut self, s: &str) -> &mut Self {
        self.u32(s.len() as u32);
        self.0.extend_from_slice(s.as_bytes());
        self
    }
    fn element(&mut self, symbol: f32, frame: f32, tx: f32) -> &mut Self {
        self.f32(symbol).f32(frame).f32(0.0);
        self.f32(1.0).f32(0.0).f32(0.0).f32(1.0).f32(tx).f32(0.0).f32(0.5)
    }
}

/// Two clips: "idle" (all facings, 2 frames) and "walk_side" (left|right, 1 frame).
fn sample() -> Vec<u8> {
    let mut b = Bytes(ANIM_MAGIC.to_vec());
    b.u32(4).u32(3).u32(3).u32(1).u32(2);

    b.str("idle").u8(0xFF).u32(0x1234).f32(30.0).u32(2);
    // frame 0: one event, one element
    b.f32(-10.0).f32(-20.0).f32(20.0).f32(40.0);
    b.u32(1).u32(0xE1);
    b.u32(1).element(111.0, 0.0, 5.0);
    // frame 1: no events, two elements
    b.f32(0.0).f32(0.0).f32(1.0).f32(1.0);
    b.u32(0);
    b.u32(2).element(111.0, 1.0, 0.0).element(222.0, 0.0, -3.0);

    b.str("walk_side").u8(0b0000_0101).u32(0x1234).f32(0.0).u32(1);
    b.f32(0.0).f32(0.0).f32(0.0).f32(0.0);
    b.u32(0).u32(0);

    b.u32(1).u32(0x1234).str("wilson");
    b.0
}

#[test]
fn test_decode_anim() {
    let data = sample();
    let anim = AnimFile::decode(&data).unwrap();

    assert_eq!(anim.version, 4);
    assert_eq!(anim.element_count, 3);
    assert_eq!(anim.event_count, 1);
    assert_eq!(anim.animations.len(), 2);

    let idle = anim.animation(b"idle").unwrap();
    assert_eq!(idle.facing, FacingMask::All);
    assert_eq!(idle.root_symbol, 0x1234);
    assert_eq!(idle.frame_rate, 30.0);
    assert_eq!(idle.frames.len(), 2);
    assert_eq!(idle.frames[0].events, vec![0xE1]);
    assert_eq!(idle.frames[0].bbox.w, 20.0);
    assert_eq!(idle.frames[0].elements[0].transform.tx, 5.0);
    assert_eq!(idle.frames[1].elements.len(), 2);
    assert_eq!(idle.frames[1].elements[1].symbol_hash, 222.0);
    assert_eq!(idle.frames[1].elements[1].transform.z, 0.5);

    let walk = anim.animation(b"walk_side").unwrap();
    assert_eq!(
        walk.facing,
        FacingMask::Directions(Facing::RIGHT | Facing::LEFT)
    );
    assert!(walk.frames[0].elements.is_empty());

    assert_eq!(anim.string_for(0x1234).unwrap(), b"wilson");
}

#[test]
fn test_decode_is_deterministic() {
    let data = sample();
    let first = AnimFile::decode(&data).unwrap();
    let second = AnimFile::decode(&data).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_duration() {
    let data = sample();
    let anim = AnimFile::decode(&data).unwrap();
    assert_eq!(anim.animations[0].duration(), Some(2.0 / 30.0));
    assert_eq!(anim.animations[1].duration(), None);
}

#[test]
fn test_transform_apply() {
    let t = Transform {
        tx: 10.0,
        ty: -5.0,
        ..Transform::IDENTITY
    };
    assert_eq!(t.apply(1.0, 2.0), (11.0, -3.0));

    // 90° rotation
    let r = Transform {
        a: 0.0,
        b: 1.0,
        c: -1.0,
        d: 0.0,
        ..Transform::IDENTITY
    };
    assert_eq!(r.apply(1.0, 0.0), (0.0, 1.0));
}

#[test]
fn test_wrong_version() {
    let mut data = sample();
    data[4..8].copy_from_slice(&6u32.to_le_bytes());
    assert!(matches!(
        AnimFile::decode(&data),
        Err(FormatError::StructuralMismatch {
            what: "version",
            offset: 4,
            ..
        })
    ));
}

#[test]
fn test_wrong_magic() {
    let mut data = sample();
    data[..4].copy_from_slice(b"BILD");
    assert!(matches!(
        AnimFile::decode(&data),
        Err(FormatError::StructuralMismatch { what: "magic", .. })
    ));
}

#[test]
fn test_element_count_past_end() {
    let mut b = Bytes(ANIM_MAGIC.to_vec());
    b.u32(4).u32(0).u32(1).u32(0).u32(1);
    b.str("broken").u8(1).u32(0).f32(30.0).u32(1);
    b.f32(0.0).f32(0.0).f32(0.0).f32(0.0);
    b.u32(0).u32(1);
    // one element declared, only half of it present
    b.f32(1.0).f32(0.0).f32(0.0).f32(1.0).f32(0.0);
    assert!(matches!(
        AnimFile::decode(&b.0),
        Err(FormatError::OutOfRange { need: 4, have: 0, .. })
    ));
}

#[test]
fn test_huge_animation_count_fails_cleanly() {
    let mut b = Bytes(ANIM_MAGIC.to_vec());
    b.u32(4).u32(0).u32(0).u32(0).u32(u32::MAX);
    // 1 MiB of body, far short of four billion clips
    b.0.resize(b.0.len() + (1 << 20), 0);
    assert!(matches!(
        AnimFile::decode(&b.0),
        Err(FormatError::OutOfRange { .. })
    ));
}

#[test]
fn test_serialize_json() {
    let data = sample();
    let anim = AnimFile::decode(&data).unwrap();
    let json = serde_json::to_value(&anim.animations[1]).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 5);
    assert_eq!(json["name"], "walk_side");
    assert_eq!(json["facing"]["directions"][1], "LEFT");
}
