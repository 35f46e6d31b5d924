//! Console demo: install the enriched logger over a plain console writer
//! and log from a few shapes of call site.

use std::io::Write;

use anyhow::Result;
use log::kv;
use log::{Level, Log, Metadata, Record};

use callsite_enrich::EnrichLogger;

/// Minimal console sink; renders the message followed by the structured
/// key-values the enrichment layer attached.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        let mut pairs = KvCollector::default();
        // Collection failures just drop attributes from the console line.
        let _ = record.key_values().visit(&mut pairs);

        let mut line = format!("[{:5}] {}", record.level(), record.args());
        for (key, value) in &pairs.entries {
            line.push_str(&format!(" {key}={value}"));
        }
        let _ = writeln!(std::io::stderr(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[derive(Default)]
struct KvCollector {
    entries: Vec<(String, String)>,
}

impl<'kv> kv::VisitSource<'kv> for KvCollector {
    fn visit_pair(&mut self, key: kv::Key<'kv>, value: kv::Value<'kv>) -> Result<(), kv::Error> {
        self.entries.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

fn main() -> Result<()> {
    EnrichLogger::new(Box::new(ConsoleLogger)).install(log::LevelFilter::Debug)?;

    log::info!("Hello, World!");

    let from_closure = || log::debug!("logged from inside a closure");
    from_closure();

    greet("caller identity comes from the record metadata");
    Ok(())
}

fn greet(message: &str) {
    log::info!("{message}");
}
