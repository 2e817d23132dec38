use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use market_data::{PriceSource, YahooClient};
use stock_sim::command::{parse_script, Command, HELP};
use stock_sim::demo::demo_source;
use stock_sim::render::{render_dashboard, render_fills, RenderOptions};
use stock_sim::{Simulator, SimulatorConfig, TradeAction};

#[derive(Debug, Parser)]
#[command(name = "stock-sim", version, about = "Paper-trade stocks against a virtual balance")]
struct Args {
    /// TOML config file; defaults are used when omitted
    #[arg(short, long, env = "STOCK_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Initial stock symbol
    #[arg(short, long)]
    ticker: Option<String>,

    /// Initial history window in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Initial dollars per trade
    #[arg(short, long)]
    amount: Option<f64>,

    /// Use built-in synthetic prices instead of Yahoo Finance
    #[arg(long)]
    offline: bool,

    /// `;`-separated commands to run before exiting, e.g. "buy; trades"
    #[arg(long)]
    script: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Chart width in characters
    #[arg(long, default_value_t = 60)]
    chart_width: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting stock-sim v{}", stock_sim::VERSION);

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load_from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => SimulatorConfig::default(),
    };
    config.apply_env_overrides()?;

    let options = RenderOptions {
        chart_width: args.chart_width,
    };

    if args.offline {
        info!("Using offline demo prices");
        let sim = build(demo_source(), &config, &args)?;
        run(sim, args.script.as_deref(), &options).await
    } else {
        let client = YahooClient::new(config.yahoo.clone())?;
        let sim = build(client, &config, &args)?;
        run(sim, args.script.as_deref(), &options).await
    }
}

fn build<S: PriceSource>(source: S, config: &SimulatorConfig, args: &Args) -> anyhow::Result<Simulator<S>> {
    let mut sim = Simulator::new(source, config)?;
    if let Some(ticker) = &args.ticker {
        sim.set_ticker(ticker)?;
    }
    if let Some(days) = args.days {
        sim.set_history_days(days)?;
    }
    if let Some(amount) = args.amount {
        sim.set_investment(amount)?;
    }
    Ok(sim)
}

enum Step {
    Continue,
    Stop,
}

async fn apply<S: PriceSource>(sim: &mut Simulator<S>, command: Command, options: &RenderOptions) -> Step {
    let action = match command {
        Command::Quit => return Step::Stop,
        Command::Help => {
            println!("{}", HELP);
            return Step::Continue;
        }
        Command::Trades => {
            let account = sim.account();
            print!("{}", render_fills(account.read().fills()));
            return Step::Continue;
        }
        Command::Refresh => None,
        Command::Buy => Some(TradeAction::Buy),
        Command::Sell => Some(TradeAction::Sell),
        Command::Ticker(symbol) => {
            report(sim.set_ticker(&symbol));
            None
        }
        Command::Days(days) => {
            report(sim.set_history_days(days));
            None
        }
        Command::Amount(amount) => {
            report(sim.set_investment(amount));
            None
        }
    };

    let dashboard = sim.refresh(action).await;
    println!("{}", render_dashboard(&dashboard, options));
    Step::Continue
}

fn report(result: anyhow::Result<()>) {
    if let Err(e) = result {
        println!("✘ {}", e);
    }
}

async fn run<S: PriceSource>(mut sim: Simulator<S>, script: Option<&str>, options: &RenderOptions) -> anyhow::Result<()> {
    if let Some(script) = script {
        let commands = parse_script(script)?;
        println!("{}", render_dashboard(&sim.refresh(None).await, options));
        for command in commands {
            if let Step::Stop = apply(&mut sim, command, options).await {
                break;
            }
        }
        return Ok(());
    }

    println!("{}", render_dashboard(&sim.refresh(None).await, options));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                println!();
                None
            }
        };
        let Some(line) = line else { break };

        match line.parse::<Command>() {
            Ok(command) => {
                if let Step::Stop = apply(&mut sim, command, options).await {
                    break;
                }
            }
            Err(e) => {
                warn!("Rejected input {:?}", line);
                println!("✘ {}", e);
            }
        }
    }

    let metrics = sim.metrics();
    info!(
        "Session ended: {} trades, {} rejected, {} price fetches ({} failed)",
        metrics.trades_executed(),
        metrics.trades_rejected(),
        metrics.price_fetches(),
        metrics.fetch_failures()
    );
    println!("Final balance: {}", stock_sim::utils::format_currency(sim.balance()));
    Ok(())
}
