use super::WaveformLoader;
use crate::data::{BitString, Signal, SignalKind, Timescale, TimeUnit, ValueChange};
use crate::document::WaveformDocument;
use crate::error::*;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Streaming VCD parser. Reads the input line by line, so peak memory is
/// bounded by the in-memory model, not file size plus model.
pub struct VcdLoader;

impl VcdLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VcdLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformLoader for VcdLoader {
    fn load_waveform(&self, path: &Path) -> Result<WaveformDocument> {
        let file = File::open(path).map_err(|e| Error::FileAccess {
            path: path.display().to_string(),
            source: e,
        })?;

        parse_vcd(BufReader::new(file))
    }
}

/// Parse VCD text from any buffered reader into a document.
pub fn parse_vcd<R: BufRead>(input: R) -> Result<WaveformDocument> {
    VcdParser::new(input).parse()
}

/// Whitespace tokens of the input, one line at a time.
struct Tokens<R: BufRead> {
    input: R,
    queue: VecDeque<String>,
    line: String,
    line_no: usize,
}

impl<R: BufRead> Tokens<R> {
    fn new(input: R) -> Self {
        Self {
            input,
            queue: VecDeque::new(),
            line: String::new(),
            line_no: 0,
        }
    }

    fn next(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(tok) = self.queue.pop_front() {
                return Ok(Some(tok));
            }

            self.line.clear();
            if self.input.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            self.queue
                .extend(self.line.split_whitespace().map(str::to_string));
        }
    }

    /// Line of the most recently yielded token.
    fn line_no(&self) -> usize {
        self.line_no
    }
}

struct VcdParser<R: BufRead> {
    tokens: Tokens<R>,
    timescale: Option<Timescale>,
    scope_stack: Vec<String>,
    signals: Vec<Signal>,
    changes: Vec<Vec<ValueChange>>,
    ids: HashMap<String, usize>,
}

impl<R: BufRead> VcdParser<R> {
    fn new(input: R) -> Self {
        Self {
            tokens: Tokens::new(input),
            timescale: None,
            scope_stack: Vec::new(),
            signals: Vec::new(),
            changes: Vec::new(),
            ids: HashMap::new(),
        }
    }

    fn parse(mut self) -> Result<WaveformDocument> {
        self.parse_header()?;
        let time_range = self.parse_body()?;

        debug!(
            signals = self.signals.len(),
            from = time_range.0,
            to = time_range.1,
            "parsed VCD document"
        );

        Ok(WaveformDocument::new(
            self.timescale,
            self.signals,
            self.changes,
            time_range,
        ))
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::MalformedHeader {
            line: self.tokens.line_no(),
            reason: reason.into(),
        }
    }

    fn bad_value(&self, reason: impl Into<String>) -> Error {
        Error::ValueFormat {
            line: self.tokens.line_no(),
            reason: reason.into(),
        }
    }

    //
    // Header phase
    //

    fn parse_header(&mut self) -> Result<()> {
        loop {
            let tok = self
                .tokens
                .next()?
                .ok_or_else(|| self.malformed("unexpected end of file before $enddefinitions"))?;

            match tok.as_str() {
                "$timescale" => self.parse_timescale()?,
                "$scope" => self.parse_scope()?,
                "$upscope" => {
                    self.expect_end()?;
                    if self.scope_stack.pop().is_none() {
                        return Err(self.malformed("$upscope without matching $scope"));
                    }
                }
                "$var" => self.parse_var()?,
                "$comment" | "$date" | "$version" => self.skip_to_end()?,
                "$enddefinitions" => {
                    self.expect_end()?;
                    if !self.scope_stack.is_empty() {
                        return Err(self.malformed(format!(
                            "unterminated scope '{}' at $enddefinitions",
                            self.scope_stack.join(".")
                        )));
                    }
                    return Ok(());
                }
                other => {
                    return Err(self.malformed(format!("unexpected token '{}' in header", other)))
                }
            }
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.tokens.next()? {
            Some(tok) if tok == "$end" => Ok(()),
            Some(tok) => Err(self.malformed(format!("expected $end, found '{}'", tok))),
            None => Err(self.malformed("unexpected end of file, expected $end")),
        }
    }

    fn skip_to_end(&mut self) -> Result<()> {
        loop {
            match self.tokens.next()? {
                Some(tok) if tok == "$end" => return Ok(()),
                Some(_) => continue,
                None => return Err(self.malformed("unexpected end of file, expected $end")),
            }
        }
    }

    fn collect_until_end(&mut self) -> Result<Vec<String>> {
        let mut rv = Vec::new();
        loop {
            match self.tokens.next()? {
                Some(tok) if tok == "$end" => return Ok(rv),
                Some(tok) => rv.push(tok),
                None => return Err(self.malformed("unexpected end of file, expected $end")),
            }
        }
    }

    fn parse_timescale(&mut self) -> Result<()> {
        let args = self.collect_until_end()?;

        // both "1 ns" and "1ns" appear in the wild
        let (mag_str, unit_str) = match args.len() {
            1 => {
                let arg = &args[0];
                match arg.find(|c: char| !c.is_ascii_digit()) {
                    Some(idx) if idx > 0 => (arg[..idx].to_string(), arg[idx..].to_string()),
                    _ => return Err(self.malformed(format!("invalid timescale '{}'", arg))),
                }
            }
            2 => (args[0].clone(), args[1].clone()),
            _ => return Err(self.malformed("expected '<magnitude> <unit>' in $timescale")),
        };

        let magnitude: u32 = mag_str
            .parse()
            .map_err(|_| self.malformed(format!("invalid timescale magnitude '{}'", mag_str)))?;
        let unit = TimeUnit::from_string(&unit_str)
            .map_err(|_| self.malformed(format!("invalid timescale unit '{}'", unit_str)))?;

        self.timescale = Some(Timescale::new(magnitude, unit));
        Ok(())
    }

    fn parse_scope(&mut self) -> Result<()> {
        let args = self.collect_until_end()?;

        // scope type is informational, only the name enters the path
        match args.as_slice() {
            [_scope_type, name] => {
                self.scope_stack.push(name.clone());
                Ok(())
            }
            _ => Err(self.malformed("expected '<type> <name>' in $scope")),
        }
    }

    fn parse_var(&mut self) -> Result<()> {
        let args = self.collect_until_end()?;

        let (kind, width, id, name) = match args.as_slice() {
            [kind, width, id, name] => (kind, width, id, name),
            [kind, width, id, name, index] if index.starts_with('[') => (kind, width, id, name),
            _ => {
                return Err(
                    self.malformed("expected '<type> <width> <id> <name> [index]' in $var")
                )
            }
        };

        let width: u32 = width
            .parse()
            .map_err(|_| self.malformed(format!("invalid variable width '{}'", width)))?;
        if width == 0 {
            return Err(self.malformed(format!("variable '{}' has zero width", name)));
        }

        let index = self.signals.len();
        match self.ids.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(self.malformed(format!("duplicate identifier code '{}'", id)))
            }
            Entry::Vacant(e) => {
                e.insert(index);
            }
        }

        self.signals.push(Signal::new(
            &self.scope_stack,
            name.clone(),
            width,
            SignalKind::from_token(kind),
        ));
        self.changes.push(Vec::new());

        Ok(())
    }

    //
    // Body phase
    //

    fn parse_body(&mut self) -> Result<(u64, u64)> {
        let mut current: u64 = 0;
        let mut saw_marker = false;
        let mut bounds: Option<(u64, u64)> = None;

        while let Some(tok) = self.tokens.next()? {
            match tok.as_bytes()[0] {
                b'#' => {
                    let t: u64 = tok[1..]
                        .parse()
                        .map_err(|_| self.bad_value(format!("invalid timestamp '{}'", tok)))?;

                    if saw_marker && t < current {
                        return Err(Error::TimeOrdering {
                            line: self.tokens.line_no(),
                            last: current,
                            new: t,
                        });
                    }

                    current = t;
                    saw_marker = true;
                    bounds = Self::observe(bounds, t);
                }

                b'0' | b'1' | b'x' | b'X' | b'z' | b'Z' => {
                    let (value, id) = tok.split_at(1);
                    if id.is_empty() {
                        return Err(self.bad_value(format!("scalar record '{}' has no identifier", tok)));
                    }
                    self.record_change(id, value, current)?;
                    if !saw_marker {
                        bounds = Self::observe(bounds, current);
                    }
                }

                b'b' | b'B' => {
                    let value = tok[1..].to_string();
                    let id = self.tokens.next()?.ok_or_else(|| {
                        self.bad_value("vector record truncated at end of file")
                    })?;
                    self.record_change(&id, &value, current)?;
                    if !saw_marker {
                        bounds = Self::observe(bounds, current);
                    }
                }

                // real and string changes fall outside the four-state value
                // model and are skipped together with their identifier
                b'r' | b'R' | b's' | b'S' => {
                    self.tokens.next()?;
                }

                b'$' => match tok.as_str() {
                    "$dumpvars" | "$dumpall" | "$dumpon" | "$dumpoff" | "$end" => {}
                    "$comment" => self.skip_to_end()?,
                    other => {
                        return Err(self.bad_value(format!("unexpected directive '{}' in body", other)))
                    }
                },

                _ => return Err(self.bad_value(format!("unexpected token '{}'", tok))),
            }
        }

        Ok(bounds.unwrap_or((0, 0)))
    }

    fn observe(bounds: Option<(u64, u64)>, t: u64) -> Option<(u64, u64)> {
        match bounds {
            None => Some((t, t)),
            Some((min, max)) => Some((min.min(t), max.max(t))),
        }
    }

    fn record_change(&mut self, id: &str, value: &str, time: u64) -> Result<()> {
        let index = *self
            .ids
            .get(id)
            .ok_or_else(|| Error::UnknownSignalReference {
                line: self.tokens.line_no(),
                id: id.to_string(),
            })?;

        let declared = self.signals[index].width;
        if value.len() as u32 != declared {
            return Err(self.bad_value(format!(
                "value '{}' has {} bits but '{}' is declared with width {}",
                value,
                value.len(),
                self.signals[index].path,
                declared
            )));
        }

        let value = BitString::new(value).map_err(|_| {
            self.bad_value(format!("value '{}' contains characters outside 0/1/x/z", value))
        })?;

        self.changes[index].push(ValueChange { time, value });
        Ok(())
    }
}
