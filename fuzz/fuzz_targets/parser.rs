#![no_main]

use arbitrary::Arbitrary;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Value {
    String(String),
    List(Vec<Value>),
    Tuple(Vec<(String, Value)>),
}

impl Value {
    fn to_mi(&self) -> String {
        match self {
            Value::String(s) => format!("{:?}", s),
            Value::List(values) => format!("[{}]", values.iter().map(Value::to_mi).join(",")),
            Value::Tuple(results) => format!("{{{}}}", results_to_mi(results)),
        }
    }
}

fn results_to_mi(results: &[(String, Value)]) -> String {
    results
        .iter()
        .map(|(name, value)| format!("{}={}", name, value.to_mi()))
        .join(",")
}

#[derive(Debug, Clone, Arbitrary)]
enum Record {
    Async(Option<u32>, char, String, Vec<(String, Value)>),
    Stream(char, String, bool),
    Result(Option<u32>, String, Vec<(String, Value)>),
    Raw(String),
}

impl Record {
    fn to_mi(&self) -> String {
        let token = |t: &Option<u32>| t.map(|t| t.to_string()).unwrap_or_default();

        match self {
            Record::Async(t, sigil, class, results) => {
                let mut line = format!("{}{}{}", token(t), sigil, class);
                if !results.is_empty() {
                    line.push(',');
                    line.push_str(&results_to_mi(results));
                }
                line.push('\n');
                line
            }
            Record::Stream(sigil, text, newline) => {
                format!("{}{:?}{}", sigil, text, if *newline { "\n" } else { "" })
            }
            Record::Result(t, class, results) => {
                let mut line = format!("{}^{}", token(t), class);
                if !results.is_empty() {
                    line.push(',');
                    line.push_str(&results_to_mi(results));
                }
                line.push('\n');
                line
            }
            Record::Raw(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    raw_output: Option<String>,
    records: Vec<Record>,
    prompt: bool,
}

fuzz_target!(|context: Context| {
    let output = match &context.raw_output {
        Some(raw) => raw.clone(),
        None => {
            let mut output = context.records.iter().map(Record::to_mi).join("");
            if context.prompt {
                output.push_str("(gdb)\n");
            }
            output
        }
    };

    let lenient = gdbmi::parse(&output, gdbmi::Options::default());
    let pedantic = gdbmi::parse(&output, gdbmi::Options::pedantic());

    if let Ok(document) = pedantic {
        assert_eq!(lenient.as_ref(), Ok(&document));
        assert_eq!(gdbmi::parse(&document.to_string(), gdbmi::Options::pedantic()), Ok(document));
    }
});
