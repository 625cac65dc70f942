//! Fixed-width console tables.

use std::io::{self, Write};

use crate::runner::Timing;
use crate::strong::StrongSeries;
use crate::weak::WeakRow;

const RULE_WIDTH: usize = 60;

fn banner<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)?;
    writeln!(w, "{}", title)?;
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

fn time_cell(timing: &Timing) -> String {
    match timing.seconds() {
        Some(secs) => format!("{:.4}", secs),
        None => "FAILED".to_string(),
    }
}

fn speedup_cell(speedup: Option<f64>) -> String {
    match speedup {
        Some(s) => format!("{:.2}x", s),
        None => "-".to_string(),
    }
}

fn failure_note<W: Write>(w: &mut W, failed: usize) -> io::Result<()> {
    if failed > 0 {
        writeln!(w, "({} measurement(s) failed; see warnings above)", failed)?;
    }
    Ok(())
}

pub fn write_strong<W: Write>(w: &mut W, series: &[StrongSeries]) -> io::Result<()> {
    banner(w, "STRONG SCALING EXPERIMENT (Fixed N, Varying P)")?;
    writeln!(
        w,
        "{:<10} {:<10} {:<10} {:<10}",
        "InputSize", "Threads", "Time(s)", "Speedup"
    )?;

    for s in series {
        writeln!(w, "--- Input Size: {} ---", s.input_size)?;
        for row in &s.rows {
            let m = &row.measurement;
            writeln!(
                w,
                "{:<10} {:<10} {:<10} {:<10}",
                m.input_size,
                m.threads,
                time_cell(&m.timing),
                speedup_cell(row.speedup)
            )?;
        }
    }

    failure_note(w, series.iter().map(StrongSeries::failures).sum())?;
    writeln!(w)
}

pub fn write_weak<W: Write>(w: &mut W, rows: &[WeakRow]) -> io::Result<()> {
    banner(w, "WEAK SCALING EXPERIMENT (Scale N as P increases)")?;
    writeln!(w, "{:<10} {:<10} {:<10}", "InputSize", "Threads", "Time(s)")?;

    for row in rows {
        let m = &row.measurement;
        writeln!(
            w,
            "{:<10} {:<10} {:<10}",
            m.input_size,
            m.threads,
            time_cell(&m.timing)
        )?;
    }

    failure_note(
        w,
        rows.iter()
            .filter(|r| r.measurement.timing.is_failure())
            .count(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::runner::Measurement;
    use crate::strong::StrongRow;

    fn measurement(n: u64, p: usize, timing: Timing) -> Measurement {
        Measurement {
            input_size: n,
            threads: p,
            timing,
        }
    }

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_strong_table_rows() {
        let series = vec![StrongSeries {
            input_size: 100,
            rows: vec![
                StrongRow {
                    measurement: measurement(100, 1, Timing::Success(0.5)),
                    speedup: Some(1.0),
                },
                StrongRow {
                    measurement: measurement(100, 2, Timing::Success(0.25)),
                    speedup: Some(2.0),
                },
            ],
        }];
        let out = render(|w| write_strong(w, &series));

        assert!(out.contains("InputSize  Threads    Time(s)    Speedup"));
        assert!(out.contains("--- Input Size: 100 ---"));
        assert!(out.contains("100        1          0.5000     1.00x"));
        assert!(out.contains("100        2          0.2500     2.00x"));
        assert!(!out.contains("failed"));
    }

    #[test]
    fn test_failed_rows_are_marked() {
        let series = vec![StrongSeries {
            input_size: 10,
            rows: vec![StrongRow {
                measurement: measurement(10, 1, Timing::Failure(MeasureError::NotUtf8)),
                speedup: None,
            }],
        }];
        let out = render(|w| write_strong(w, &series));
        assert!(out.contains("10         1          FAILED     -"));
        assert!(out.contains("(1 measurement(s) failed"));
    }

    #[test]
    fn test_weak_table_has_no_speedup_column() {
        let rows = vec![
            WeakRow {
                target_size: 100.0,
                measurement: measurement(100, 1, Timing::Success(1.0)),
            },
            WeakRow {
                target_size: 141.4,
                measurement: measurement(141, 2, Timing::Success(1.25)),
            },
        ];
        let out = render(|w| write_weak(w, &rows));
        assert!(out.contains("WEAK SCALING EXPERIMENT"));
        assert!(!out.contains("Speedup"));
        assert!(out.contains("141        2          1.2500"));
    }
}
