//! Opaque pagination cursors.
//!
//! A cursor is the url-safe, unpadded base64 encoding of a small versioned JSON document
//! holding the [`SortKey`] of the last subject of a page, tagged with its sort mode. Cursors
//! built for one sort mode are rejected when presented with another.

use crate::{
    api::{Error, SortMode, SubjectId, Time},
    SortKey,
};

const CURSOR_VERSION: u8 = 1;

// Generous bound on the encoded length of any valid cursor
const MAX_CURSOR_LEN: usize = 512;

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(tag = "mode")]
enum RawCursor {
    Newest {
        v: u8,
        created_at: Time,
        id: SubjectId,
    },
    Top {
        v: u8,
        score: i64,
        created_at: Time,
        id: SubjectId,
    },
}

pub fn encode(key: &SortKey) -> String {
    let raw = match *key {
        SortKey::Newest { created_at, id } => RawCursor::Newest {
            v: CURSOR_VERSION,
            created_at,
            id,
        },
        SortKey::Top {
            score,
            created_at,
            id,
        } => RawCursor::Top {
            v: CURSOR_VERSION,
            score,
            created_at,
            id,
        },
    };
    let json = serde_json::to_vec(&raw).expect("serializing cursor");
    base64::encode_config(json, base64::URL_SAFE_NO_PAD)
}

pub fn decode(cursor: &str, mode: SortMode) -> Result<SortKey, Error> {
    if cursor.len() > MAX_CURSOR_LEN {
        return Err(Error::MalformedCursor(String::from("cursor is too long")));
    }
    let json = base64::decode_config(cursor, base64::URL_SAFE_NO_PAD)
        .map_err(|e| Error::MalformedCursor(format!("invalid base64: {e}")))?;
    let raw: RawCursor = serde_json::from_slice(&json)
        .map_err(|e| Error::MalformedCursor(format!("invalid contents: {e}")))?;
    let (v, key) = match raw {
        RawCursor::Newest { v, created_at, id } => (v, SortKey::Newest { created_at, id }),
        RawCursor::Top {
            v,
            score,
            created_at,
            id,
        } => (
            v,
            SortKey::Top {
                score,
                created_at,
                id,
            },
        ),
    };
    if v != CURSOR_VERSION {
        return Err(Error::MalformedCursor(format!("unknown cursor version {v}")));
    }
    if key.mode() != mode {
        return Err(Error::MismatchedSortMode {
            expected: mode,
            found: key.mode(),
        });
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::*;

    #[test]
    fn round_trip() {
        bolero::check!()
            .with_type::<(u128, i32, u32, i64)>()
            .cloned()
            .for_each(|(id, secs, nanos, score)| {
                let mut s = post(id, secs as i64);
                let nanos = chrono::Duration::nanoseconds((nanos % 1_000_000_000) as i64);
                s.created_at = s.created_at + nanos;
                for mode in [SortMode::Newest, SortMode::Top] {
                    let key = SortKey::of(mode, &s, score);
                    assert_eq!(decode(&encode(&key), mode), Ok(key));
                }
            });
    }

    #[test]
    fn mismatched_mode_is_rejected() {
        let s = post(1, 0);
        let top = encode(&SortKey::of(SortMode::Top, &s, 3));
        assert_eq!(
            decode(&top, SortMode::Newest),
            Err(Error::MismatchedSortMode {
                expected: SortMode::Newest,
                found: SortMode::Top,
            })
        );
        let newest = encode(&SortKey::of(SortMode::Newest, &s, 3));
        assert_eq!(
            decode(&newest, SortMode::Top),
            Err(Error::MismatchedSortMode {
                expected: SortMode::Top,
                found: SortMode::Newest,
            })
        );
    }

    fn assert_malformed(cursor: &str) {
        match decode(cursor, SortMode::Newest) {
            Err(Error::MalformedCursor(_)) => (),
            r => panic!("expected malformed cursor for {cursor:?}, got {r:?}"),
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert_malformed("");
        assert_malformed("not base64!!");
        assert_malformed(&base64::encode_config(b"{}", base64::URL_SAFE_NO_PAD));
        assert_malformed(&base64::encode_config(
            br#"{"mode":"Hot","v":1}"#,
            base64::URL_SAFE_NO_PAD,
        ));
        assert_malformed(&base64::encode_config(
            br#"{"mode":"Newest","v":2,"created_at":"2023-11-14T22:13:20Z","id":"ffffffff-ffff-ffff-ffff-ffffffffffff"}"#,
            base64::URL_SAFE_NO_PAD,
        ));
        assert_malformed(&"A".repeat(MAX_CURSOR_LEN + 1));
    }

    #[test]
    fn arbitrary_input_never_panics() {
        bolero::check!().with_type::<String>().for_each(|s| {
            let _ = decode(s, SortMode::Top);
        });
    }
}
