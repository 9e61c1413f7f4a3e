//! Formatted terminal output.
//!
//! Kept separate from the pipeline so the math stays free of presentation and
//! output changes stay local.

use crate::domain::{MarketSummary, RunSummary};

/// Format the full run summary.
pub fn format_run_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let (dom, fgn) = (&summary.domestic, &summary.foreign);

    out.push_str("=== carry - NSS curves, real carry and Black-76 ===\n");
    out.push_str(&format!("Analysis date: {}\n", summary.analysis_date));

    out.push_str("\nCurve fits:\n");
    out.push_str(&format_market(dom));
    out.push_str(&format_market(fgn));

    let s = &summary.spread_stats;
    out.push_str(&format!("\n{}-{} spread (fitted, {} grid):\n", fgn.label, dom.label, fgn.label));
    out.push_str(&format!(
        "  mean={} min={} max={} std={}\n",
        pct(s.mean, 2),
        pct(s.min, 2),
        pct(s.max, 2),
        pct(s.std, 2)
    ));

    let c = &summary.carry;
    out.push_str(&format!(
        "\nReal carry {} vs {} @ {:.1}y: {} (inflation {} / {})\n",
        fgn.label,
        dom.label,
        c.target_tenor,
        pct(c.real_carry, 2),
        pct(c.inflation_foreign, 2),
        pct(c.inflation_domestic, 2)
    ));

    let o = &summary.option;
    out.push_str(&format!(
        "\nOption on {} {:.2}y point ({:.2}y expiry, vol {}):\n",
        fgn.label,
        o.underlying_maturity,
        o.expiry,
        pct(o.volatility, 1)
    ));
    out.push_str(&format!(
        "  F={:.6} K={:.6} r={:.6}\n",
        o.forward, o.strike, o.rate
    ));
    out.push_str(&format!("  call={:.4} put={:.4}\n", o.call, o.put));

    out
}

fn format_market(m: &MarketSummary) -> String {
    let status = if m.converged { "" } else { " (not converged)" };
    format!(
        "  {:<6} n={:<3} RMSE={} iters={}{status}\n         params: {}\n",
        m.label,
        m.observations,
        pct(m.rmse, 4),
        m.iterations,
        fmt_vec(&m.params.to_array()),
    )
}

fn pct(v: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, v * 100.0)
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CarrySummary, CurveParameters, OptionSummary, SpreadStatistics};
    use chrono::NaiveDate;

    fn market(label: &str, converged: bool) -> MarketSummary {
        MarketSummary {
            label: label.to_string(),
            observations: 5,
            params: CurveParameters::from_array([0.1, -0.02, 0.01, 0.0, 1.0, 5.0]),
            rmse: 0.000123,
            converged,
            iterations: 17,
        }
    }

    fn summary() -> RunSummary {
        RunSummary {
            analysis_date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
            domestic: market("US", true),
            foreign: market("BR", false),
            spread_stats: SpreadStatistics {
                mean: 0.085,
                min: 0.08,
                max: 0.09,
                std: 0.004,
            },
            carry: CarrySummary {
                target_tenor: 10.0,
                inflation_domestic: 0.025,
                inflation_foreign: 0.055,
                real_carry: 0.045,
            },
            option: OptionSummary {
                underlying_maturity: 10.0,
                forward: 0.13,
                strike: 0.13,
                expiry: 1.0,
                rate: 0.13,
                volatility: 0.15,
                call: 0.0069,
                put: 0.0069,
            },
        }
    }

    #[test]
    fn summary_mentions_key_numbers() {
        let text = format_run_summary(&summary());
        assert!(text.contains("Analysis date: 2026-01-20"));
        assert!(text.contains("RMSE=0.0123%"));
        assert!(text.contains("BR-US spread"));
        assert!(text.contains("mean=8.50%"));
        assert!(text.contains("Real carry BR vs US @ 10.0y: 4.50%"));
        assert!(text.contains("call=0.0069 put=0.0069"));
    }

    #[test]
    fn flags_non_converged_fits() {
        let text = format_run_summary(&summary());
        assert_eq!(text.matches("(not converged)").count(), 1);
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(pct(0.045, 2), "4.50%");
        assert_eq!(pct(0.15, 1), "15.0%");
    }
}
