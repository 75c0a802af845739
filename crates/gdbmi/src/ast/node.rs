use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One decoded MI response: the out-of-band records in arrival order and at most one result
/// record.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Document {
    pub out_of_band: Vec<OutOfBandRecord>,
    pub result: Option<ResultRecord>,
}

impl Document {
    pub fn async_records(&self) -> impl Iterator<Item = &AsyncRecord> {
        self.out_of_band.iter().filter_map(|record| match record {
            OutOfBandRecord::Async(record) => Some(record),
            OutOfBandRecord::Stream(_) => None,
        })
    }

    pub fn stream_records(&self) -> impl Iterator<Item = &StreamRecord> {
        self.out_of_band.iter().filter_map(|record| match record {
            OutOfBandRecord::Stream(record) => Some(record),
            OutOfBandRecord::Async(_) => None,
        })
    }

    /// Concatenated text of every console (`~`) stream record.
    pub fn console_output(&self) -> String {
        self.stream_records()
            .filter(|record| record.kind == StreamKind::Console)
            .map(|record| record.text.as_str())
            .collect()
    }

    /// The `msg` of an `^error` result record.
    pub fn error_message(&self) -> Option<&str> {
        self.result
            .as_ref()
            .filter(|result| result.result_class() == ResultClass::Error)
            .and_then(|result| result.get("msg"))
            .and_then(Value::as_str)
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum OutOfBandRecord {
    Async(AsyncRecord),
    Stream(StreamRecord),
}

impl From<AsyncRecord> for OutOfBandRecord {
    fn from(record: AsyncRecord) -> Self {
        OutOfBandRecord::Async(record)
    }
}

impl From<StreamRecord> for OutOfBandRecord {
    fn from(record: StreamRecord) -> Self {
        OutOfBandRecord::Stream(record)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum AsyncKind {
    /// `*`: state changes of the target (running, stopped).
    #[cfg_attr(feature = "serde", serde(rename = "*"))]
    Exec,
    /// `+`: progress of slow operations.
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Status,
    /// `=`: supplementary information (breakpoints, threads, libraries).
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Notify,
}

impl AsyncKind {
    pub fn sigil(&self) -> char {
        match self {
            AsyncKind::Exec => '*',
            AsyncKind::Status => '+',
            AsyncKind::Notify => '=',
        }
    }
}

impl TryFrom<char> for AsyncKind {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '*' => Ok(AsyncKind::Exec),
            '+' => Ok(AsyncKind::Status),
            '=' => Ok(AsyncKind::Notify),
            _ => Err(c),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum StreamKind {
    /// `~`: text for the CLI console window.
    #[cfg_attr(feature = "serde", serde(rename = "~"))]
    Console,
    /// `@`: output produced by the running target.
    #[cfg_attr(feature = "serde", serde(rename = "@"))]
    Target,
    /// `&`: gdb's internal log messages.
    #[cfg_attr(feature = "serde", serde(rename = "&"))]
    Log,
}

impl StreamKind {
    pub fn sigil(&self) -> char {
        match self {
            StreamKind::Console => '~',
            StreamKind::Target => '@',
            StreamKind::Log => '&',
        }
    }
}

impl TryFrom<char> for StreamKind {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '~' => Ok(StreamKind::Console),
            '@' => Ok(StreamKind::Target),
            '&' => Ok(StreamKind::Log),
            _ => Err(c),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct AsyncRecord {
    pub token: Option<u64>,
    pub kind: AsyncKind,
    pub class: SmolStr,
    pub results: Vec<NamedResult>,
}

impl AsyncRecord {
    pub fn get(&self, name: &str) -> Option<&Value> {
        find(&self.results, name)
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct StreamRecord {
    pub kind: StreamKind,
    pub text: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ResultRecord {
    pub token: Option<u64>,
    pub class: SmolStr,
    /// `None` when no comma followed the class.
    pub results: Option<Vec<NamedResult>>,
}

impl ResultRecord {
    pub fn result_class(&self) -> ResultClass {
        ResultClass::from(self.class.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.results.as_deref().and_then(|results| find(results, name))
    }
}

/// The result classes gdb documents for `^` records.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ResultClass {
    Done,
    Running,
    Connected,
    Error,
    Exit,
    Other,
}

impl From<&str> for ResultClass {
    fn from(class: &str) -> Self {
        match class {
            "done" => ResultClass::Done,
            "running" => ResultClass::Running,
            "connected" => ResultClass::Connected,
            "error" => ResultClass::Error,
            "exit" => ResultClass::Exit,
            _ => ResultClass::Other,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NamedResult {
    pub name: SmolStr,
    pub value: Value,
}

impl NamedResult {
    pub fn new(name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An MI value. Tuples and bracketed result lists both become [`Value::Tuple`]; names keep
/// their order and duplicates are not merged.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Value {
    String(String),
    List(Vec<Value>),
    Tuple(Vec<NamedResult>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[NamedResult]> {
        match self {
            Value::Tuple(results) => Some(results.as_slice()),
            _ => None,
        }
    }

    /// First member of a tuple named `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_tuple().and_then(|results| find(results, name))
    }

    /// Every member of a tuple named `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.as_tuple()
            .unwrap_or_default()
            .iter()
            .filter(move |result| result.name.as_str() == name)
            .map(|result| &result.value)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::String(s) => s.is_empty(),
            Value::List(values) => values.is_empty(),
            Value::Tuple(results) => results.is_empty(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl From<Vec<NamedResult>> for Value {
    fn from(results: Vec<NamedResult>) -> Self {
        Value::Tuple(results)
    }
}

#[inline(always)]
fn find<'a>(results: &'a [NamedResult], name: &str) -> Option<&'a Value> {
    results
        .iter()
        .find(|result| result.name.as_str() == name)
        .map(|result| &result.value)
}

/// Writes `s` as a C string, escaping what the lexer would otherwise reject or decode.
fn write_c_string(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if c.is_ascii_control() => write!(f, "\\{:03o}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

fn write_results(f: &mut Formatter<'_>, results: &[NamedResult]) -> fmt::Result {
    for result in results {
        write!(f, ",{}", result)?;
    }
    Ok(())
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write_c_string(f, s),
            Value::List(values) => write!(f, "[{}]", values.iter().join(",")),
            Value::Tuple(results) => write!(f, "{{{}}}", results.iter().join(",")),
        }
    }
}

impl Display for NamedResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

impl Display for AsyncRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{}", token)?;
        }
        write!(f, "{}{}", self.kind.sigil(), self.class)?;
        write_results(f, &self.results)
    }
}

impl Display for StreamRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.sigil())?;
        write_c_string(f, &self.text)
    }
}

impl Display for OutOfBandRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            OutOfBandRecord::Async(record) => write!(f, "{}", record),
            OutOfBandRecord::Stream(record) => write!(f, "{}", record),
        }
    }
}

impl Display for ResultRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(token) = self.token {
            write!(f, "{}", token)?;
        }
        write!(f, "^{}", self.class)?;
        match &self.results {
            Some(results) => write_results(f, results),
            None => Ok(()),
        }
    }
}

/// Renders the document as MI output, one record per line, ending with the `(gdb)` prompt.
impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for record in &self.out_of_band {
            writeln!(f, "{}", record)?;
        }
        if let Some(result) = &self.result {
            writeln!(f, "{}", result)?;
        }
        writeln!(f, "(gdb)")
    }
}
