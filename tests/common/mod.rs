#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tmpldoc::domain::prompt_types::*;

/// The bundled prompt templates.
pub fn bundled_templates() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
}

/// A temporary template directory holding `files` (relative path, text).
pub fn template_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    dir
}

pub fn sample_system_prompt() -> SystemPromptData {
    SystemPromptData {
        model: ModelConfig {
            name: "GPT-4".into(),
        },
        market: MarketConfig {
            exchange: "Hyperliquid".into(),
            asset_universe: "BTC, ETH, SOL".into(),
            starting_capital: 10_000.0,
            market_hours: "24/7".into(),
            contract_type: "Perpetual futures".into(),
            leverage: Range::new(1.0, 20.0),
            trading_fee: Range::new(0.02, 0.05),
            slippage: Range::new(0.1, 0.5),
            min_position_size: 100.0,
            max_position_concentration: Percentage(30.0),
        },
        risk: RiskConfig {
            max_loss_per_trade: Range::new(1.0, 3.0),
            min_risk_reward_ratio: 2.5,
            min_liquidation_distance: Percentage(20.0),
        },
        timing: TimingConfig {
            decision_frequency: Duration::new(5, "minutes"),
            short_interval: Duration::new(3, "minutes"),
            long_interval: Duration::new(4, "hours"),
            recent_data_points_short: 50,
            recent_data_points_long: 30,
            focus_recent_points: 3,
        },
        output: OutputConfig {
            coin_symbols: vec!["BTC".into(), "ETH".into(), "SOL".into()],
            max_justification_chars: 500,
        },
    }
}

pub fn sample_user_prompt() -> UserPromptData {
    UserPromptData {
        session: SessionInfo {
            minutes_elapsed: 120,
        },
        timeframes: TimeframeConfig {
            short_interval_minutes: 3,
            long_interval_hours: 4,
        },
        coins: vec![CoinData {
            symbol: "BTC".into(),
            current: CurrentSnapshot {
                price: 45_000.0,
                ema20: 44_800.0,
                macd: 150.5,
                rsi7: 65.5,
            },
            ..Default::default()
        }],
        account: AccountInfo {
            performance: PerformanceMetrics {
                return_pct: 5.25,
                sharpe_ratio: 1.8,
            },
            status: AccountStatus {
                cash_available: 8_500.0,
                account_value: 10_500.0,
            },
        },
        positions: Vec::new(),
    }
}
