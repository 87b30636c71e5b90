pub mod cryptocompare;

pub use cryptocompare::CryptoCompareProvider;
