use ohlc_index::{IndexAssembler, Resampling};
use ohlc_index_mock::by_pair;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,ohlc_index=debug cargo run --example assemble_index --features tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    let assembler = IndexAssembler::builder()
        .max_impute_len(3)
        .impute_window(6)
        .oc_tolerance(0.001)
        .price_precision(Some(2))
        .build()?;

    let mut series = by_pair("BTCUSD").unwrap_or_default();
    series.extend(by_pair("ETHUSD").unwrap_or_default());
    let report = assembler.batch().series(series)?.run().await?;

    for (pair, index) in &report.results {
        let q = &index.quality;
        println!(
            "{pair}: {} bars, {} gap bars, {} unresolved gaps",
            q.total_bars,
            q.gap_bars,
            q.unresolved_gap_count()
        );
        for ex in &q.exchanges {
            println!(
                "  {:<10} coverage {:>6.2}%  imputed {:>3}  aligned {:>3}",
                ex.exchange.as_str(),
                ex.coverage_pct(),
                ex.imputed_bars,
                ex.aligned_opens
            );
        }
        for w in &q.warnings {
            eprintln!("  warning: {w}");
        }

        let hourly = index.resample(Resampling::Hourly)?;
        for bar in hourly.priced() {
            if let Some(p) = bar.prices {
                println!(
                    "  {} O {:.2} H {:.2} L {:.2} C {:.2} V {:.3}",
                    bar.ts.to_rfc3339(),
                    p.open,
                    p.high,
                    p.low,
                    p.close,
                    bar.volume
                );
            }
        }
    }

    if let Some(index) = report.results.values().next() {
        println!("{}", serde_json::to_string_pretty(&index.quality)?);
    }

    if !report.warnings.is_empty() {
        eprintln!("failed pairs:");
        for w in report.warnings {
            eprintln!("- {w}");
        }
    }

    Ok(())
}
