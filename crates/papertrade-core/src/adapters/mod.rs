mod simulated;
mod yahoo;

pub use simulated::SimulatedSource;
pub use yahoo::YahooSource;
