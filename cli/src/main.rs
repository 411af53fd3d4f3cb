use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use exchange::{
  weex::types::{MarginMode, SetLeverageRequest, DEFAULT_PAGE_SIZE},
  Config, OrderKind, OrderRequest, Side, Weex,
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod render;

/// Command-line client for the WEEX contract trading API.
///
/// Credentials come from WEEX_API_KEY, WEEX_SECRET_KEY and WEEX_PASSPHRASE
/// (a .env file is read first). WEEX_API_BASE_URL, WEEX_PROXY (or
/// HTTPS_PROXY/HTTP_PROXY) and WEEX_LOCALE are optional.
#[derive(Parser)]
#[command(name = "weex-cli", version, about)]
struct Cli {
  /// Log signed requests and responses, and print raw position data
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Account assets
  Account,
  /// Ticker for a symbol
  Price(SymbolArgs),
  /// Active orders
  Orders(SymbolArgs),
  /// Order history
  History(PageArgs),
  /// Trade fills
  Fills(PageArgs),
  /// Position for one symbol, or every known symbol when -s is omitted
  Positions(PositionsArgs),
  /// Leverage settings
  #[command(subcommand)]
  Leverage(LeverageCommand),
  /// Place an order
  Order(OrderArgs),
  /// Cancel an order
  Cancel(CancelArgs),
}

#[derive(Subcommand)]
enum LeverageCommand {
  /// Show leverage for a symbol
  Get(SymbolArgs),
  /// Change leverage for a symbol
  Set(SetLeverageArgs),
}

#[derive(Args)]
struct SymbolArgs {
  /// Contract symbol, e.g. cmt_btcusdt
  #[arg(short, long)]
  symbol: String,
}

#[derive(Args)]
struct PageArgs {
  #[arg(short, long)]
  symbol: String,
  /// Number of records
  #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
  size: u32,
}

#[derive(Args)]
struct PositionsArgs {
  #[arg(short, long)]
  symbol: Option<String>,
}

#[derive(Args)]
struct SetLeverageArgs {
  #[arg(short, long)]
  symbol: String,
  /// Long leverage multiple
  #[arg(long)]
  long: u32,
  /// Short leverage multiple
  #[arg(long)]
  short: u32,
  /// Margin mode: 1 = cross, 2 = isolated
  #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
  mode: u8,
}

#[derive(Args)]
struct OrderArgs {
  #[arg(short, long)]
  symbol: String,
  /// buy or sell
  #[arg(short = 'd', long)]
  side: Side,
  /// market or limit
  #[arg(short = 't', long = "type")]
  kind: OrderKind,
  /// Order size in contract units
  #[arg(short = 'z', long)]
  size: Decimal,
  /// Limit price (required for limit orders)
  #[arg(long)]
  price: Option<Decimal>,
}

#[derive(Args)]
struct CancelArgs {
  order_id: String,
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose {
    "info,exchange=debug,weex_cli=debug"
  } else {
    "info"
  };
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
    )
    .with_writer(std::io::stderr)
    .init();

  if let Err(e) = dotenvy::dotenv() {
    if !e.not_found() {
      tracing::warn!("ignoring unreadable .env file: {}", e);
    }
  }

  let config = Config::from_env().context("WEEX credentials are not configured")?;
  let weex = Weex::from_config(&config).context("failed to set up HTTP client")?;

  run(&weex, cli.command, cli.verbose).await
}

async fn run(weex: &Weex, command: Command, verbose: bool) -> Result<()> {
  match command {
    Command::Account => {
      let assets = weex.account_assets().await.context("account assets query failed")?;
      render::titled("Account assets", &assets);
    }
    Command::Price(args) => {
      let ticker = weex.ticker(&args.symbol).await.context("ticker query failed")?;
      render::titled(&format!("{} ticker", args.symbol), &ticker);
    }
    Command::Orders(args) => {
      let orders = weex
        .current_orders(&args.symbol)
        .await
        .context("current orders query failed")?;
      render::orders(&orders);
    }
    Command::History(args) => {
      let history = weex
        .order_history(&args.symbol, args.size)
        .await
        .context("order history query failed")?;
      render::titled("Order history", &history);
    }
    Command::Fills(args) => {
      let fills = weex
        .fills(&args.symbol, args.size)
        .await
        .context("fills query failed")?;
      render::titled("Fills", &fills);
    }
    Command::Positions(PositionsArgs { symbol: Some(symbol) }) => {
      let response = weex
        .single_position(&symbol)
        .await
        .context("position query failed")?;
      render::single_position(&symbol, &response, verbose);
    }
    Command::Positions(PositionsArgs { symbol: None }) => {
      tracing::info!(symbols = weex.precision().len(), "querying positions for every symbol");
      render::all_positions(&weex.all_positions().await, verbose);
    }
    Command::Leverage(LeverageCommand::Get(args)) => {
      let leverage = weex.leverage(&args.symbol).await.context("leverage query failed")?;
      render::titled("Leverage", &leverage);
    }
    Command::Leverage(LeverageCommand::Set(args)) => {
      let mode = MarginMode::try_from(args.mode).map_err(anyhow::Error::msg)?;
      let request = SetLeverageRequest::new(&args.symbol, mode, args.long, args.short);
      weex.set_leverage(&request).await.context("set leverage failed")?;
      println!(
        "Leverage on {} set: long {}x, short {}x, margin mode {}",
        args.symbol, args.long, args.short, args.mode
      );
    }
    Command::Order(args) => {
      let order = OrderRequest {
        symbol: args.symbol,
        side: args.side,
        kind: args.kind,
        size: args.size,
        price: args.price,
      };
      let placed = weex.place_order(&order).await.context("order placement failed")?;
      render::placed_order(&order, &placed);
    }
    Command::Cancel(args) => {
      weex
        .cancel_order(&args.order_id)
        .await
        .context("order cancellation failed")?;
      println!("Order {} cancelled", args.order_id);
    }
  }
  Ok(())
}
