//! Opaque payload codec.
//!
//! Callers above this crate treat payloads as uninterpreted strings; only this
//! module knows they are JSON documents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Clip, GroupId, ModelError, Producer, Transition};

#[derive(Debug, Serialize, Deserialize)]
struct ClipDocument {
    clips: Vec<ClipRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClipRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    uuid: Option<Uuid>,
    producer: Producer,
    frame_in: i32,
    frame_out: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group: Option<GroupId>,
}

pub fn encode_clips(clips: &[Clip]) -> Result<String, ModelError> {
    let doc = ClipDocument {
        clips: clips
            .iter()
            .map(|c| ClipRecord {
                uuid: Some(c.uuid),
                producer: c.producer.clone(),
                frame_in: c.frame_in,
                frame_out: c.frame_out,
                group: c.group,
            })
            .collect(),
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a clip payload. Records without a uuid get a fresh one; records
/// whose range does not fit `0 <= frame_in <= frame_out < producer.length`
/// fail the whole payload.
pub fn decode_clips(payload: &str) -> Result<Vec<Clip>, ModelError> {
    let doc: ClipDocument = serde_json::from_str(payload)?;
    if doc.clips.is_empty() {
        return Err(ModelError::EmptyPayload);
    }
    doc.clips
        .into_iter()
        .map(|r| {
            if r.frame_in < 0 || r.frame_in > r.frame_out || r.frame_out >= r.producer.length {
                return Err(ModelError::InvalidRange {
                    frame_in: r.frame_in,
                    frame_out: r.frame_out,
                    length: r.producer.length,
                });
            }
            Ok(Clip {
                uuid: r.uuid.unwrap_or_else(Uuid::new_v4),
                producer: r.producer,
                frame_in: r.frame_in,
                frame_out: r.frame_out,
                group: r.group,
            })
        })
        .collect()
}

/// Decode clips for placement as new timeline content: fresh identities, no group.
pub fn decode_new_clips(payload: &str) -> Result<Vec<Clip>, ModelError> {
    let mut clips = decode_clips(payload)?;
    for clip in &mut clips {
        clip.uuid = Uuid::new_v4();
        clip.group = None;
    }
    Ok(clips)
}

pub fn encode_transition(transition: &Transition) -> Result<String, ModelError> {
    Ok(serde_json::to_string(transition)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_uuid_gets_fresh_identity() {
        let json = r#"{"clips":[{"producer":{"resource":"a.mp4","length":50},"frame_in":0,"frame_out":9}]}"#;
        let clips = decode_clips(json).unwrap();
        assert_eq!(clips.len(), 1);
        assert_eq!(clips[0].length(), 10);
        assert_eq!(clips[0].producer.gain, 1.0);
        assert!(!clips[0].uuid.is_nil());
    }

    #[test]
    fn encoded_clip_keeps_identity() {
        let clip = Clip::whole(Producer::new("a.mp4", 25));
        let payload = encode_clips(std::slice::from_ref(&clip)).unwrap();
        assert_eq!(decode_clips(&payload).unwrap(), vec![clip.clone()]);
        assert_ne!(decode_new_clips(&payload).unwrap()[0].uuid, clip.uuid);
    }

    #[test]
    fn empty_and_malformed_payloads_are_rejected() {
        assert!(matches!(
            decode_clips(r#"{"clips":[]}"#),
            Err(ModelError::EmptyPayload)
        ));
        assert!(matches!(decode_clips("<mlt/>"), Err(ModelError::Payload(_))));
    }

    #[test]
    fn out_of_range_records_are_rejected() {
        let record = |frame_in: i32, frame_out: i32| {
            format!(
                r#"{{"clips":[{{"producer":{{"resource":"a.mp4","length":50}},"frame_in":{frame_in},"frame_out":{frame_out}}}]}}"#
            )
        };
        for (frame_in, frame_out) in [(10, 5), (-1, 9), (0, 50)] {
            assert!(
                matches!(
                    decode_new_clips(&record(frame_in, frame_out)),
                    Err(ModelError::InvalidRange { length: 50, .. })
                ),
                "[{frame_in}, {frame_out}] accepted"
            );
        }
        assert!(decode_clips(&record(0, 49)).is_ok());
    }
}
