use crate::data::Signal;
use crate::document::WaveformDocument;
use crate::error::*;
use crate::formatting::{format_value, ValueFormat};

use regex::RegexBuilder;

/// Rendered changes of one signal within a query window.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalWindow {
    pub path: String,
    pub values: Vec<(u64, String)>,
}

/// Result of a value query. Names that did not resolve end up in
/// `not_found` instead of failing the whole call; `warnings` collects
/// per-value format fallbacks as `path@time: ...` messages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValuesQuery {
    pub signals: Vec<SignalWindow>,
    pub not_found: Vec<String>,
    pub warnings: Vec<String>,
}

impl WaveformDocument {
    /// Enumerate signals in declaration order, optionally filtered by a
    /// case-insensitive substring or regular expression matched against
    /// the full hierarchical path.
    pub fn list_signals(&self, pattern: Option<&str>, use_regex: bool) -> Result<Vec<&Signal>> {
        match pattern {
            None => Ok(self.signals().iter().collect()),

            Some(pattern) if use_regex => {
                let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
                Ok(self
                    .signals()
                    .iter()
                    .filter(|s| re.is_match(&s.path))
                    .collect())
            }

            Some(pattern) => {
                let needle = pattern.to_lowercase();
                Ok(self
                    .signals()
                    .iter()
                    .filter(|s| s.path.to_lowercase().contains(&needle))
                    .collect())
            }
        }
    }

    /// Recorded changes of the named signals inside `[start, end]`,
    /// rendered in `format`.
    ///
    /// Carry-forward is applied: a signal that last changed before `start`
    /// and has no change exactly at `start` reports that value once at
    /// `start`, so the window is self-contained. `start > end` yields an
    /// empty window, not an error.
    pub fn signal_values<S: AsRef<str>>(
        &self,
        names: &[S],
        start: u64,
        end: u64,
        format: ValueFormat,
    ) -> ValuesQuery {
        let mut rv = ValuesQuery::default();

        for name in names {
            let name = name.as_ref();
            let index = match self.index_of_path(name) {
                Some(index) => index,
                None => {
                    rv.not_found.push(name.to_string());
                    continue;
                }
            };

            let mut values = Vec::new();

            if start <= end {
                let log = self.changes_of(index);
                let lo = log.partition_point(|c| c.time < start);
                let hi = log.partition_point(|c| c.time <= end);

                let in_window = &log[lo..hi];
                let carried = lo > 0
                    && in_window
                        .first()
                        .map(|c| c.time > start)
                        .unwrap_or(true);

                let changes = carried
                    .then(|| (start, &log[lo - 1].value))
                    .into_iter()
                    .chain(in_window.iter().map(|c| (c.time, &c.value)));

                for (time, value) in changes {
                    let (text, warning) = format_value(value, format);
                    if let Some(warning) = warning {
                        rv.warnings.push(format!("{}@{}: {}", name, time, warning));
                    }
                    values.push((time, text));
                }
            }

            rv.signals.push(SignalWindow {
                path: name.to_string(),
                values,
            });
        }

        rv
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use crate::load::vcd::parse_vcd;

    fn make_test_document() -> WaveformDocument {
        let text = "\
$timescale 1 ns $end
$scope module TOP $end
$scope module CLK_DIV $end
$var wire 1 ! clk $end
$upscope $end
$var reg 4 \" count [3:0] $end
$var wire 1 # reset_n $end
$upscope $end
$scope module clk $end
$var wire 1 $ enable $end
$upscope $end
$enddefinitions $end
#0
0!
b0000 \"
1#
#5
1!
b0001 \"
#10
0!
b001x \"
#15
1!
";
        parse_vcd(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_list_all_in_declaration_order() {
        let doc = make_test_document();
        let names: Vec<&str> = doc
            .list_signals(None, false)
            .unwrap()
            .iter()
            .map(|s| s.path.as_str())
            .collect();

        assert_eq!(
            vec![
                "TOP.CLK_DIV.clk",
                "TOP.count",
                "TOP.reset_n",
                "clk.enable"
            ],
            names
        );
    }

    #[test]
    fn test_substring_filter_case_insensitive() {
        let doc = make_test_document();
        let names: Vec<&str> = doc
            .list_signals(Some("clk"), false)
            .unwrap()
            .iter()
            .map(|s| s.path.as_str())
            .collect();

        // matches anywhere in the full path, including scope names
        assert_eq!(vec!["TOP.CLK_DIV.clk", "clk.enable"], names);
    }

    #[test]
    fn test_regex_filter() {
        let doc = make_test_document();

        let names: Vec<&str> = doc
            .list_signals(Some(r"clk$"), true)
            .unwrap()
            .iter()
            .map(|s| s.path.as_str())
            .collect();
        assert_eq!(vec!["TOP.CLK_DIV.clk"], names);

        let none = doc.list_signals(Some(r"^clk$"), true).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        let doc = make_test_document();
        assert!(matches!(
            doc.list_signals(Some("["), true),
            Err(Error::Pattern(_))
        ));
    }

    #[test]
    fn test_values_in_window() {
        let doc = make_test_document();
        let reply = doc.signal_values(&["TOP.CLK_DIV.clk"], 0, 10, ValueFormat::Bin);

        assert!(reply.not_found.is_empty());
        assert_eq!(1, reply.signals.len());
        assert_eq!(
            vec![
                (0, "0".to_string()),
                (5, "1".to_string()),
                (10, "0".to_string())
            ],
            reply.signals[0].values
        );
    }

    #[test]
    fn test_single_point_window() {
        let doc = make_test_document();
        let reply = doc.signal_values(&["TOP.CLK_DIV.clk"], 5, 5, ValueFormat::Bin);

        assert_eq!(vec![(5, "1".to_string())], reply.signals[0].values);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let doc = make_test_document();
        let reply = doc.signal_values(&["TOP.CLK_DIV.clk"], 10, 0, ValueFormat::Bin);

        assert!(reply.signals[0].values.is_empty());
        assert!(reply.not_found.is_empty());
    }

    #[test]
    fn test_carry_forward_into_window() {
        let doc = make_test_document();

        // count last changed at #10; a window starting later still sees it
        let reply = doc.signal_values(&["TOP.count"], 12, 20, ValueFormat::Bin);
        assert_eq!(vec![(12, "001x".to_string())], reply.signals[0].values);

        // a change exactly at the window start suppresses the synthetic entry
        let reply = doc.signal_values(&["TOP.count"], 10, 20, ValueFormat::Bin);
        assert_eq!(vec![(10, "001x".to_string())], reply.signals[0].values);
    }

    #[test]
    fn test_no_carry_forward_before_first_change() {
        let doc = parse_vcd(
            "\
$var wire 1 ! clk $end
$enddefinitions $end
#20
1!
"
            .as_bytes(),
        )
        .unwrap();

        let reply = doc.signal_values(&["clk"], 0, 10, ValueFormat::Bin);
        assert!(reply.signals[0].values.is_empty());
    }

    #[test]
    fn test_unknown_name_is_per_item() {
        let doc = make_test_document();
        let reply = doc.signal_values(
            &["TOP.CLK_DIV.clk", "TOP.bogus"],
            0,
            10,
            ValueFormat::Bin,
        );

        assert_eq!(vec!["TOP.bogus".to_string()], reply.not_found);
        assert_eq!(1, reply.signals.len());
        assert_eq!(3, reply.signals[0].values.len());
    }

    #[test]
    fn test_hex_and_dec_rendering() {
        let doc = make_test_document();

        let reply = doc.signal_values(&["TOP.count"], 0, 15, ValueFormat::Hex);
        assert_eq!(
            vec![
                (0, "0".to_string()),
                (5, "1".to_string()),
                (10, "x".to_string())
            ],
            reply.signals[0].values
        );
        assert!(reply.warnings.is_empty());

        let reply = doc.signal_values(&["TOP.count"], 0, 15, ValueFormat::Dec);
        assert_eq!(
            vec![
                (0, "0".to_string()),
                (5, "1".to_string()),
                (10, "001x".to_string())
            ],
            reply.signals[0].values
        );
        assert_eq!(1, reply.warnings.len());
        assert!(reply.warnings[0].starts_with("TOP.count@10:"));
    }

    #[test]
    fn test_signal_by_path() {
        let doc = make_test_document();
        assert!(doc.signal_by_path("TOP.count").is_ok());
        assert!(matches!(
            doc.signal_by_path("nope"),
            Err(Error::SignalNotFound(_))
        ));
    }
}
