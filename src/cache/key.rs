//! Canonical serialization of a prompt used as cache key
//!
//! Keys use the layout of Python's `json.dumps` defaults: `", "` between
//! items, `": "` between key and value, and every non-ASCII character
//! escaped as `\uXXXX`. Cache files written by earlier tooling keep hitting.

use std::io;
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::message::Turn;

/// Serializes `prompt` into its cache key
pub fn cache_key(prompt: &[Turn]) -> crate::error::Result<String>
{   to_legacy_json(prompt)
}

/// Serializes any value with the cache key layout
pub(crate) fn to_legacy_json<T>(value: &T) -> crate::error::Result<String>
where
  T: ?Sized + Serialize
{   let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(
      &mut out,
      LegacyFormatter
    );
    value.serialize(&mut ser).map_err(|e| {
      crate::error::Error::ParseError(e.to_string())
    })?;
    String::from_utf8(out).map_err(|e| {
      crate::error::Error::ParseError(e.to_string())
    })
}

/// Writes `json.dumps`-style separators and ASCII-only strings
struct LegacyFormatter;

impl Formatter for LegacyFormatter
{   fn begin_array_value<W>(&mut self, writer: &mut W, first: bool)
      -> io::Result<()>
    where
      W: ?Sized + io::Write
    {   if first
        {   Ok(())
        } else
        {   writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool)
      -> io::Result<()>
    where
      W: ?Sized + io::Write
    {   if first
        {   Ok(())
        } else
        {   writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W)
      -> io::Result<()>
    where
      W: ?Sized + io::Write
    {   writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str)
      -> io::Result<()>
    where
      W: ?Sized + io::Write
    {   if fragment.bytes().all(|b| b < 0x7f)
        {   return writer.write_all(fragment.as_bytes());
        }
        let mut units = [0u16; 2];
        for c in fragment.chars()
        {   if (c as u32) < 0x7f
            {   let mut buf = [0u8; 1];
                writer.write_all(c.encode_utf8(&mut buf).as_bytes())?;
            } else
            {   for unit in c.encode_utf16(&mut units).iter()
                {   write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}
