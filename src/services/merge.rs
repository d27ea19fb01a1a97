//! Record merger
//!
//! Pure merge of one raw country with the exchange-rate table. The estimated
//! GDP is a deliberate placeholder figure: population times a random
//! multiplier in [1000, 2000), divided by the exchange rate. The RNG is
//! injected so tests can seed it; production passes an entropy-seeded one.

use rand::Rng;
use std::collections::HashMap;

use crate::db::models::NewCountry;
use crate::services::upstream::RawCountry;

/// Lower and upper bound of the GDP multiplier
pub const GDP_MULTIPLIER_RANGE: (f64, f64) = (1000.0, 2000.0);

/// Merge one raw country with the rate table into a record ready to upsert.
///
/// The currency code is the first listed currency's code, if any. When that
/// code has an entry in the rate table, both `exchange_rate` and
/// `estimated_gdp` are set; otherwise both are left null.
pub fn merge_country(
    raw: &RawCountry,
    rates: &HashMap<String, f64>,
    rng: &mut impl Rng,
) -> NewCountry {
    let currency_code = raw
        .currencies
        .as_ref()
        .and_then(|list| list.first())
        .and_then(|currency| currency.code.clone());

    let exchange_rate = currency_code
        .as_deref()
        .and_then(|code| rates.get(code))
        .copied();

    let estimated_gdp = exchange_rate.map(|rate| {
        let multiplier = rng.gen_range(GDP_MULTIPLIER_RANGE.0..GDP_MULTIPLIER_RANGE.1);
        (raw.population as f64 * multiplier) / rate
    });

    NewCountry {
        name: raw.name.clone(),
        capital: raw.capital.clone(),
        region: raw.region.clone(),
        population: raw.population,
        currency_code,
        exchange_rate,
        estimated_gdp,
        flag_url: raw.flag.clone(),
    }
}
