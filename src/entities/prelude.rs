pub use super::currencies::Entity as Currencies;
pub use super::gold_cross_rates::Entity as GoldCrossRates;
pub use super::instrument_prices::Entity as InstrumentPrices;
pub use super::instruments::Entity as Instruments;
pub use super::locations::Entity as Locations;
pub use super::markets::Entity as Markets;
pub use super::units::Entity as Units;
