//! Nilai yang ditangkap oleh prompt
//!
//! `InputMsg` membawa teks satu baris, atau error yang menghentikan prompt.
//! Accessor typed mem-parse teks; versi `*_or_default` mengembalikan nilai nol
//! kalau ada error apa pun.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Hasil satu prompt
#[derive(Debug, Clone)]
pub struct InputMsg {
    msg: String,
    err: Option<Error>,
}

impl InputMsg {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            err: None,
        }
    }

    pub fn from_error(err: Error) -> Self {
        Self {
            msg: String::new(),
            err: Some(err),
        }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.err.is_none()
    }

    #[inline]
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    fn checked(&self) -> Result<&str> {
        match &self.err {
            Some(err) => Err(err.clone()),
            None => Ok(&self.msg),
        }
    }

    fn parse<T: FromStr>(&self, kind: &'static str) -> Result<T> {
        let value = self.checked()?;
        value.parse::<T>().map_err(|_| Error::Parse {
            value: value.to_string(),
            kind,
        })
    }

    pub fn string(&self) -> Result<String> {
        self.checked().map(str::to_string)
    }

    pub fn string_or_default(&self) -> String {
        self.string().unwrap_or_default()
    }

    pub fn int(&self) -> Result<i64> {
        self.parse("int")
    }

    pub fn int_or_default(&self) -> i64 {
        self.int().unwrap_or_default()
    }

    pub fn int64(&self) -> Result<i64> {
        self.parse("int64")
    }

    pub fn int64_or_default(&self) -> i64 {
        self.int64().unwrap_or_default()
    }

    pub fn uint64(&self) -> Result<u64> {
        self.parse("uint64")
    }

    pub fn uint64_or_default(&self) -> u64 {
        self.uint64().unwrap_or_default()
    }

    /// Menerima `1 t T TRUE true True` dan `0 f F FALSE false False`
    pub fn bool(&self) -> Result<bool> {
        let value = self.checked()?;
        match value {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
            "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
            _ => Err(Error::Parse {
                value: value.to_string(),
                kind: "bool",
            }),
        }
    }

    pub fn bool_or_default(&self) -> bool {
        self.bool().unwrap_or_default()
    }

    pub fn float64(&self) -> Result<f64> {
        self.parse("float64")
    }

    pub fn float64_or_default(&self) -> f64 {
        self.float64().unwrap_or_default()
    }

    pub fn float32(&self) -> Result<f32> {
        self.parse("float32")
    }

    pub fn float32_or_default(&self) -> f32 {
        self.float32().unwrap_or_default()
    }
}

impl From<Result<String>> for InputMsg {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(msg) => InputMsg::new(msg),
            Err(err) => InputMsg::from_error(err),
        }
    }
}

impl fmt::Display for InputMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}
