//! Prompt data records rendered by the trading-agent templates, with their
//! schema descriptors.
//!
//! Serialized names equal the Rust field names, so a record passed through
//! [`Engine::render_data`](crate::domain::engine::Engine::render_data) is
//! addressed as `{{.market.exchange}}`.

use crate::domain::schema::{Describe, RecordBuilder, TypeDescriptor};
use crate::domain::type_registry::TypeRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Numeric interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.max > self.min
    }

    /// Inclusive at both ends.
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}-{:.2}", self.min, self.max)
    }
}

impl Describe for Range {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("Range")
            .field::<f64>("min")
            .wire("min")
            .doc("Minimum value")
            .example("1")
            .field::<f64>("max")
            .wire("max")
            .doc("Maximum value")
            .example("20")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub value: i64,
    pub unit: String,
}

impl Duration {
    pub fn new(value: i64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Length in minutes, saturating at the `i64` bounds. Unknown units are
    /// taken as minutes.
    pub fn minutes(&self) -> i64 {
        match self.unit.as_str() {
            "hours" => self.value.saturating_mul(60),
            "days" => self.value.saturating_mul(24 * 60),
            _ => self.value,
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl Describe for Duration {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("Duration")
            .field::<i64>("value")
            .wire("value")
            .doc("Duration value")
            .example("5")
            .field::<String>("unit")
            .wire("unit")
            .doc("Time unit (minutes, hours, days)")
            .example("minutes")
            .build()
    }
}

/// A percentage in points: `5.0` is 5%.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub f64);

impl Percentage {
    /// `5%` → `0.05`.
    pub fn decimal(&self) -> f64 {
        self.0 / 100.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Describe for Percentage {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar("Percentage")
    }
}

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPromptData {
    pub model: ModelConfig,
    pub market: MarketConfig,
    pub risk: RiskConfig,
    pub timing: TimingConfig,
    pub output: OutputConfig,
}

impl Describe for SystemPromptData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("SystemPromptData")
            .field::<ModelConfig>("model")
            .wire("model")
            .doc("Model configuration")
            .field::<MarketConfig>("market")
            .wire("market")
            .doc("Market and trading environment configuration")
            .field::<RiskConfig>("risk")
            .wire("risk")
            .doc("Risk management parameters")
            .field::<TimingConfig>("timing")
            .wire("timing")
            .doc("Timing and frequency settings")
            .field::<OutputConfig>("output")
            .wire("output")
            .doc("Output format configuration")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
}

impl Describe for ModelConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("ModelConfig")
            .field::<String>("name")
            .wire("name")
            .doc("Model name/designation")
            .example("GPT-4")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub exchange: String,
    pub asset_universe: String,
    pub starting_capital: f64,
    pub market_hours: String,
    pub contract_type: String,
    pub leverage: Range,
    pub trading_fee: Range,
    pub slippage: Range,
    pub min_position_size: f64,
    pub max_position_concentration: Percentage,
}

impl Describe for MarketConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("MarketConfig")
            .field::<String>("exchange")
            .wire("exchange")
            .doc("Exchange name")
            .example("Hyperliquid")
            .field::<String>("asset_universe")
            .wire("asset_universe")
            .doc("Description of tradeable assets")
            .example("BTC, ETH, SOL")
            .field::<f64>("starting_capital")
            .wire("starting_capital")
            .doc("Initial capital in USD")
            .example("10000")
            .field::<String>("market_hours")
            .wire("market_hours")
            .doc("Trading hours")
            .example("24/7")
            .field::<String>("contract_type")
            .wire("contract_type")
            .doc("Type of contracts")
            .example("Perpetual futures")
            .field::<Range>("leverage")
            .wire("leverage")
            .doc("Allowed leverage range")
            .example(r#"{"min":1,"max":20}"#)
            .field::<Range>("trading_fee")
            .wire("trading_fee")
            .doc("Trading fee percentage range")
            .example(r#"{"min":0.02,"max":0.05}"#)
            .field::<Range>("slippage")
            .wire("slippage")
            .doc("Expected slippage percentage range")
            .example(r#"{"min":0.1,"max":0.5}"#)
            .field::<f64>("min_position_size")
            .wire("min_position_size")
            .doc("Minimum position size in USD")
            .example("100")
            .field::<Percentage>("max_position_concentration")
            .wire("max_position_concentration")
            .doc("Maximum % of capital in single position")
            .example("30")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub max_loss_per_trade: Range,
    pub min_risk_reward_ratio: f64,
    pub min_liquidation_distance: Percentage,
}

impl Describe for RiskConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("RiskConfig")
            .field::<Range>("max_loss_per_trade")
            .wire("max_loss_per_trade")
            .doc("Acceptable loss per trade (% of account)")
            .example(r#"{"min":1,"max":3}"#)
            .field::<f64>("min_risk_reward_ratio")
            .wire("min_risk_reward_ratio")
            .doc("Minimum reward-to-risk ratio")
            .example("2.5")
            .field::<Percentage>("min_liquidation_distance")
            .wire("min_liquidation_distance")
            .doc("Minimum distance from liquidation (%)")
            .example("20")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    pub decision_frequency: Duration,
    pub short_interval: Duration,
    pub long_interval: Duration,
    pub recent_data_points_short: usize,
    pub recent_data_points_long: usize,
    pub focus_recent_points: usize,
}

impl Describe for TimingConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("TimingConfig")
            .field::<Duration>("decision_frequency")
            .wire("decision_frequency")
            .doc("How often to make decisions")
            .example(r#"{"value":5,"unit":"minutes"}"#)
            .field::<Duration>("short_interval")
            .wire("short_interval")
            .doc("Short-term data interval")
            .example(r#"{"value":3,"unit":"minutes"}"#)
            .field::<Duration>("long_interval")
            .wire("long_interval")
            .doc("Long-term data interval")
            .example(r#"{"value":4,"unit":"hours"}"#)
            .field::<usize>("recent_data_points_short")
            .wire("recent_data_points_short")
            .doc("Number of recent short-interval data points")
            .example("50")
            .field::<usize>("recent_data_points_long")
            .wire("recent_data_points_long")
            .doc("Number of recent long-interval data points")
            .example("30")
            .field::<usize>("focus_recent_points")
            .wire("focus_recent_points")
            .doc("Number of most recent points to focus on")
            .example("3")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub coin_symbols: Vec<String>,
    pub max_justification_chars: usize,
}

impl Describe for OutputConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("OutputConfig")
            .field::<Vec<String>>("coin_symbols")
            .wire("coin_symbols")
            .doc("List of tradeable coin symbols")
            .example(r#"["BTC","ETH","SOL"]"#)
            .field::<usize>("max_justification_chars")
            .wire("max_justification_chars")
            .doc("Maximum characters in trade justification")
            .example("500")
            .build()
    }
}

// ---------------------------------------------------------------------------
// User prompt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPromptData {
    pub session: SessionInfo,
    pub timeframes: TimeframeConfig,
    pub coins: Vec<CoinData>,
    pub account: AccountInfo,
    pub positions: Vec<PositionData>,
}

impl Describe for UserPromptData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("UserPromptData")
            .field::<SessionInfo>("session")
            .wire("session")
            .doc("Trading session information")
            .field::<TimeframeConfig>("timeframes")
            .wire("timeframes")
            .doc("Timeframe configuration")
            .field::<Vec<CoinData>>("coins")
            .wire("coins")
            .doc("Market data for all coins")
            .field::<AccountInfo>("account")
            .wire("account")
            .doc("Account status and performance")
            .field::<Vec<PositionData>>("positions")
            .wire("positions")
            .doc("Current open positions")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub minutes_elapsed: i64,
}

impl Describe for SessionInfo {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("SessionInfo")
            .field::<i64>("minutes_elapsed")
            .wire("minutes_elapsed")
            .doc("Minutes since trading started")
            .example("120")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    pub short_interval_minutes: i64,
    pub long_interval_hours: i64,
}

impl Describe for TimeframeConfig {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("TimeframeConfig")
            .field::<i64>("short_interval_minutes")
            .wire("short_interval_minutes")
            .doc("Short-term interval in minutes")
            .example("3")
            .field::<i64>("long_interval_hours")
            .wire("long_interval_hours")
            .doc("Long-term interval in hours")
            .example("4")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoinData {
    pub symbol: String,
    pub current: CurrentSnapshot,
    pub short: TimeSeriesData,
    pub long: TimeSeriesData,
    pub futures: FuturesMetrics,
}

impl Describe for CoinData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("CoinData")
            .field::<String>("symbol")
            .wire("symbol")
            .doc("Coin symbol")
            .example("BTC")
            .field::<CurrentSnapshot>("current")
            .wire("current")
            .doc("Current market snapshot")
            .field::<TimeSeriesData>("short")
            .wire("short")
            .doc("Short-term time series data")
            .field::<TimeSeriesData>("long")
            .wire("long")
            .doc("Long-term time series data")
            .field::<FuturesMetrics>("futures")
            .wire("futures")
            .doc("Perpetual futures specific metrics")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub price: f64,
    pub ema20: f64,
    pub macd: f64,
    pub rsi7: f64,
}

impl Describe for CurrentSnapshot {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("CurrentSnapshot")
            .field::<f64>("price")
            .wire("price")
            .doc("Current price")
            .example("45000.00")
            .field::<f64>("ema20")
            .wire("ema20")
            .doc("20-period EMA")
            .example("44800.00")
            .field::<f64>("macd")
            .wire("macd")
            .doc("MACD indicator")
            .example("150.50")
            .field::<f64>("rsi7")
            .wire("rsi7")
            .doc("7-period RSI")
            .example("65.5")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesData {
    pub prices: Vec<f64>,
    pub ema20: Vec<f64>,
    pub ema50: Vec<f64>,
    pub macd: Vec<f64>,
    pub rsi7: Vec<f64>,
    pub rsi14: Vec<f64>,
    pub atr3: Vec<f64>,
    pub atr14: Vec<f64>,
}

impl Describe for TimeSeriesData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("TimeSeriesData")
            .field::<Vec<f64>>("prices")
            .wire("prices")
            .doc("Price series (oldest to newest)")
            .example("[45000, 45100, 45200]")
            .field::<Vec<f64>>("ema20")
            .wire("ema20")
            .doc("20-period EMA series")
            .example("[44800, 44850, 44900]")
            .field::<Vec<f64>>("ema50")
            .wire("ema50")
            .doc("50-period EMA series (long-term only)")
            .example("[44500, 44550, 44600]")
            .field::<Vec<f64>>("macd")
            .wire("macd")
            .doc("MACD series")
            .example("[150, 155, 160]")
            .field::<Vec<f64>>("rsi7")
            .wire("rsi7")
            .doc("7-period RSI series")
            .example("[63, 64, 65]")
            .field::<Vec<f64>>("rsi14")
            .wire("rsi14")
            .doc("14-period RSI series")
            .example("[58, 59, 60]")
            .field::<Vec<f64>>("atr3")
            .wire("atr3")
            .doc("3-period ATR series (long-term only)")
            .example("[800, 810, 820]")
            .field::<Vec<f64>>("atr14")
            .wire("atr14")
            .doc("14-period ATR series (long-term only)")
            .example("[750, 760, 770]")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuturesMetrics {
    pub open_interest: OpenInterestData,
    pub funding_rate: f64,
    pub volume_current: f64,
    pub volume_average: f64,
}

impl Describe for FuturesMetrics {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("FuturesMetrics")
            .field::<OpenInterestData>("open_interest")
            .wire("open_interest")
            .doc("Open interest data")
            .field::<f64>("funding_rate")
            .wire("funding_rate")
            .doc("Current funding rate")
            .example("0.0001")
            .field::<f64>("volume_current")
            .wire("volume_current")
            .doc("Current volume")
            .example("1500000000")
            .field::<f64>("volume_average")
            .wire("volume_average")
            .doc("Average volume")
            .example("1200000000")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenInterestData {
    pub latest: f64,
    pub average: f64,
}

impl Describe for OpenInterestData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("OpenInterestData")
            .field::<f64>("latest")
            .wire("latest")
            .doc("Latest open interest")
            .example("850000000")
            .field::<f64>("average")
            .wire("average")
            .doc("Average open interest")
            .example("800000000")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub performance: PerformanceMetrics,
    pub status: AccountStatus,
}

impl Describe for AccountInfo {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("AccountInfo")
            .field::<PerformanceMetrics>("performance")
            .wire("performance")
            .doc("Performance metrics")
            .field::<AccountStatus>("status")
            .wire("status")
            .doc("Current account status")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub return_pct: f64,
    pub sharpe_ratio: f64,
}

impl Describe for PerformanceMetrics {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("PerformanceMetrics")
            .field::<f64>("return_pct")
            .wire("return_pct")
            .doc("Total return percentage")
            .example("5.25")
            .field::<f64>("sharpe_ratio")
            .wire("sharpe_ratio")
            .doc("Sharpe ratio")
            .example("1.8")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountStatus {
    pub cash_available: f64,
    pub account_value: f64,
}

impl Describe for AccountStatus {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("AccountStatus")
            .field::<f64>("cash_available")
            .wire("cash_available")
            .doc("Available cash in USD")
            .example("8500.00")
            .field::<f64>("account_value")
            .wire("account_value")
            .doc("Total account value in USD")
            .example("10500.00")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub symbol: String,
    pub quantity: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub liquidation_price: f64,
    pub unrealized_pnl: f64,
    pub leverage: i64,
    pub exit_plan: ExitPlan,
    pub confidence: f64,
    pub risk_usd: f64,
    pub notional_usd: f64,
}

impl Describe for PositionData {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("PositionData")
            .field::<String>("symbol")
            .wire("symbol")
            .doc("Position symbol")
            .example("BTC")
            .field::<f64>("quantity")
            .wire("quantity")
            .doc("Position quantity")
            .example("0.1")
            .field::<f64>("entry_price")
            .wire("entry_price")
            .doc("Entry price")
            .example("45000.00")
            .field::<f64>("current_price")
            .wire("current_price")
            .doc("Current price")
            .example("46000.00")
            .field::<f64>("liquidation_price")
            .wire("liquidation_price")
            .doc("Liquidation price")
            .example("40000.00")
            .field::<f64>("unrealized_pnl")
            .wire("unrealized_pnl")
            .doc("Unrealized profit/loss")
            .example("100.00")
            .field::<i64>("leverage")
            .wire("leverage")
            .doc("Position leverage")
            .example("5")
            .field::<ExitPlan>("exit_plan")
            .wire("exit_plan")
            .doc("Exit strategy")
            .field::<f64>("confidence")
            .wire("confidence")
            .doc("Trade confidence (0-1)")
            .example("0.75")
            .field::<f64>("risk_usd")
            .wire("risk_usd")
            .doc("Risk amount in USD")
            .example("150.00")
            .field::<f64>("notional_usd")
            .wire("notional_usd")
            .doc("Notional value in USD")
            .example("4500.00")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExitPlan {
    pub profit_target: f64,
    pub stop_loss: f64,
    pub invalidation_condition: String,
}

impl Describe for ExitPlan {
    fn descriptor() -> TypeDescriptor {
        RecordBuilder::new("ExitPlan")
            .field::<f64>("profit_target")
            .wire("profit_target")
            .doc("Take profit price")
            .example("48000.00")
            .field::<f64>("stop_loss")
            .wire("stop_loss")
            .doc("Stop loss price")
            .example("44000.00")
            .field::<String>("invalidation_condition")
            .wire("invalidation_condition")
            .doc("Condition that invalidates the trade")
            .example("BTC breaks below $43000")
            .build()
    }
}

/// Register every prompt record under its type name.
pub fn register_all(registry: &mut TypeRegistry) {
    registry.register("SystemPromptData", SystemPromptData::descriptor);
    registry.register("ModelConfig", ModelConfig::descriptor);
    registry.register("MarketConfig", MarketConfig::descriptor);
    registry.register("RiskConfig", RiskConfig::descriptor);
    registry.register("TimingConfig", TimingConfig::descriptor);
    registry.register("OutputConfig", OutputConfig::descriptor);
    registry.register("UserPromptData", UserPromptData::descriptor);
    registry.register("SessionInfo", SessionInfo::descriptor);
    registry.register("TimeframeConfig", TimeframeConfig::descriptor);
    registry.register("CoinData", CoinData::descriptor);
    registry.register("CurrentSnapshot", CurrentSnapshot::descriptor);
    registry.register("TimeSeriesData", TimeSeriesData::descriptor);
    registry.register("FuturesMetrics", FuturesMetrics::descriptor);
    registry.register("OpenInterestData", OpenInterestData::descriptor);
    registry.register("AccountInfo", AccountInfo::descriptor);
    registry.register("PerformanceMetrics", PerformanceMetrics::descriptor);
    registry.register("AccountStatus", AccountStatus::descriptor);
    registry.register("PositionData", PositionData::descriptor);
    registry.register("ExitPlan", ExitPlan::descriptor);
    registry.register("Range", Range::descriptor);
    registry.register("Duration", Duration::descriptor);
}

/// A registry holding every prompt record.
pub fn default_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_all(&mut registry);
    registry
}
