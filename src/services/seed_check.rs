//! Startup validation that every configured reference code exists. Jobs
//! skip individual missing codes at runtime, but a hole in the fixed
//! configuration set means the deployment is missing seed data and the
//! process refuses to start.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::collections::HashSet;

use crate::config::{
    fx_pair_codes, BANK_MARKET_CODES, FUEL_INSTRUMENTS, FUEL_MARKET_CODE, FX_CURRENCIES,
    FX_MARKET_CODE, MMK_CODE, MM_GOLD_INSTRUMENTS, MM_GOLD_MARKET_CODE, UNIT_BASE_CURRENCY,
    UNIT_KYAT_THA, UNIT_LITRE, UNIT_OUNCE, USD_CODE, WORLD_GOLD_INSTRUMENTS,
    WORLD_GOLD_MARKET_CODE,
};
use crate::entities::{currencies, instruments, markets, prelude::*, units};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn missing_from(existing: &HashSet<String>, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|code| !existing.contains(*code))
        .cloned()
        .collect()
}

pub async fn validate_required_seeds(db: &DatabaseConnection) -> Result<(), BoxError> {
    let required_markets: Vec<String> = std::iter::once(FX_MARKET_CODE)
        .chain(BANK_MARKET_CODES.iter().copied())
        .chain([WORLD_GOLD_MARKET_CODE, MM_GOLD_MARKET_CODE, FUEL_MARKET_CODE])
        .map(str::to_string)
        .collect();

    let required_instruments: Vec<String> = fx_pair_codes()
        .into_iter()
        .chain(WORLD_GOLD_INSTRUMENTS.iter().map(|s| s.to_string()))
        .chain(MM_GOLD_INSTRUMENTS.iter().map(|s| s.to_string()))
        .chain(FUEL_INSTRUMENTS.iter().map(|s| s.to_string()))
        .collect();

    let required_units: Vec<String> = [UNIT_BASE_CURRENCY, UNIT_OUNCE, UNIT_KYAT_THA, UNIT_LITRE]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let required_currencies: Vec<String> = [MMK_CODE, USD_CODE]
        .into_iter()
        .chain(FX_CURRENCIES.iter().map(|c| c.code))
        .map(str::to_string)
        .collect();

    let (markets, instruments, units, currencies) = tokio::try_join!(
        async {
            Ok::<_, sea_orm::DbErr>(
                Markets::find()
                    .filter(markets::Column::Code.is_in(required_markets.clone()))
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|row| row.code)
                    .collect::<HashSet<_>>(),
            )
        },
        async {
            Ok::<_, sea_orm::DbErr>(Instruments::find()
                .filter(instruments::Column::Code.is_in(required_instruments.clone()))
                .all(db)
                .await?
                .into_iter()
                .map(|row| row.code)
                .collect::<HashSet<_>>())
        },
        async {
            Ok::<_, sea_orm::DbErr>(Units::find()
                .filter(units::Column::Code.is_in(required_units.clone()))
                .all(db)
                .await?
                .into_iter()
                .map(|row| row.code)
                .collect::<HashSet<_>>())
        },
        async {
            Ok::<_, sea_orm::DbErr>(Currencies::find()
                .filter(currencies::Column::Code.is_in(required_currencies.clone()))
                .all(db)
                .await?
                .into_iter()
                .map(|row| row.code)
                .collect::<HashSet<_>>())
        },
    )?;

    let missing_markets = missing_from(&markets, &required_markets);
    let missing_instruments = missing_from(&instruments, &required_instruments);
    let missing_units = missing_from(&units, &required_units);
    let missing_currencies = missing_from(&currencies, &required_currencies);

    if !missing_markets.is_empty()
        || !missing_instruments.is_empty()
        || !missing_units.is_empty()
        || !missing_currencies.is_empty()
    {
        tracing::error!(
            "Missing required seed data: markets={:?} instruments={:?} units={:?} currencies={:?}",
            missing_markets,
            missing_instruments,
            missing_units,
            missing_currencies
        );
        return Err("missing required seed data, see logs for details".into());
    }

    tracing::info!("Seed validation OK");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_from() {
        let existing: HashSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let required: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(missing_from(&existing, &required), vec!["C".to_string()]);
    }
}
