//! Literal datasets written on every run.

use crate::records::{MarketSignal, Store};

/// Trending items for the scout view, in upsert order.
pub fn market_signals() -> Vec<MarketSignal> {
    vec![
        MarketSignal::new("Boxy Mohair Cardigan", "Adjacency", "Our Legacy", 98, 220),
        MarketSignal::new("Gore-Tex Beta LT", "Brand", "Arc'teryx", 96, 350),
        MarketSignal::new("Double Knee Carpenter", "Adjacency", "Carhartt WIP", 94, 140),
        MarketSignal::new("Tabi Boots", "Brand", "Maison Margiela", 92, 600),
        MarketSignal::new("Vintage 90s Russell Hoodie", "Adjacency", "Vintage", 88, 85),
        MarketSignal::new("Parachute Cargo Pants", "Adjacency", "Jaded London", 85, 90),
        MarketSignal::new("Samba OG", "Brand", "Adidas", 82, 110),
        MarketSignal::new("Heavyweight Flannel", "Adjacency", "Pendleton", 79, 65),
        MarketSignal::new("Baggy Silver Tab Jeans", "Brand", "Levi's", 78, 95),
        MarketSignal::new("Salomon XT-6", "Brand", "Salomon", 75, 160),
        MarketSignal::new("Detroit Jacket", "Brand", "Carhartt", 99, 280),
        MarketSignal::new("Mohawk Beanie", "Adjacency", "Supreme", 70, 55),
        MarketSignal::new("Geobasket High", "Brand", "Rick Owens", 65, 800),
        MarketSignal::new("Track Jacket (Firebird)", "Brand", "Adidas", 60, 50),
        MarketSignal::new("Camo Realtree Pants", "Adjacency", "Vintage", 88, 75),
    ]
}

/// Stores in 30064 plus one nearby zip for search testing, in upsert order.
pub fn stores() -> Vec<Store> {
    vec![
        Store::new(
            "Goodwill - Marietta Pkwy",
            "1030 N Marietta Pkwy SE",
            "30064",
            "High-Yield",
            98,
        ),
        Store::new("Park Avenue Thrift", "1234 Roswell Rd", "30064", "Volume", 82),
        Store::new("America's Thrift Stores", "2221 Cobb Pkwy", "30064", "High-Yield", 91),
        Store::new("Lost & Found Vintage", "Approx. Location", "30064", "Curated", 88),
        Store::new("Value Village", "S Cobb Dr", "30064", "Volume", 65),
        Store::new("Buckhead Thrift", "Piedmont Rd", "30305", "High-Yield", 95),
    ]
}
