//! Pools and listings seeded at startup.

use super::{Amount, Listing, Pool, PoolId};
use crate::error::LotteryError;

/// `(id, name, description)` of every coffee pool.
const COFFEE_POOLS: [(&str, &str, &str); 5] = [
    (
        "monsoon",
        "Monsoon Malabar",
        "Rich, full-bodied coffee with notes of dark chocolate and spice, aged by monsoon winds.",
    ),
    (
        "cappuccino",
        "Cappuccino Blend",
        "Perfect balance of espresso, steamed milk, and foam for the classic Italian experience.",
    ),
    (
        "baarbara",
        "Baarbara Estate",
        "Premium single-origin beans from the renowned Baarbara coffee estate in Karnataka.",
    ),
    (
        "salawara",
        "Salawara Estate",
        "Bright, citrusy coffee with floral notes from the misty hills of Salawara plantation.",
    ),
    (
        "bababudangiri",
        "Third Wave Bababudangiri",
        "Artisanal, small-batch roast celebrating the birthplace of Indian coffee in the Western Ghats.",
    ),
];

/// Price of the featured storefront listing.
pub const VILLA_PRICE: Amount = Amount::from_whole(100);

/// Builds the default coffee pools, all paying into `recipient`.
///
/// # Errors
///
/// Returns [`LotteryError::InvalidRequest`] if `capacity` is zero or
/// `recipient` is blank.
pub fn default_pools(recipient: &str, capacity: usize) -> Result<Vec<Pool>, LotteryError> {
    COFFEE_POOLS
        .iter()
        .map(|(id, name, description)| {
            Pool::new(PoolId::new(*id)?, *name, *description, recipient, capacity)
        })
        .collect()
}

/// Builds the storefront listings, paying into `recipient`.
#[must_use]
pub fn default_listings(recipient: &str) -> Vec<Listing> {
    vec![Listing {
        id: "dream-mountain-villa".to_string(),
        title: "Dream Mountain Villa".to_string(),
        description: "Stunning mountain retreat with panoramic views, modern amenities, and direct access to hiking trails.".to_string(),
        price: VILLA_PRICE,
        recipient: recipient.to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPIENT: &str = "0x64cBdcCfa295a0dB0187E5Ef7fAC28205908B4e4";

    #[test]
    fn seeds_five_empty_pools() {
        let pools = default_pools(RECIPIENT, 6).unwrap_or_default();
        assert_eq!(pools.len(), 5);
        for pool in &pools {
            assert_eq!(pool.capacity(), 6);
            assert_eq!(pool.entries(), 0);
            assert_eq!(pool.recipient(), RECIPIENT);
        }
    }

    #[test]
    fn invalid_capacity_fails_seeding() {
        assert!(default_pools(RECIPIENT, 0).is_err());
    }

    #[test]
    fn villa_costs_one_hundred() {
        let listings = default_listings(RECIPIENT);
        assert_eq!(listings.len(), 1);
        assert!(listings.iter().all(|l| l.price == Amount::from_whole(100)));
    }
}
