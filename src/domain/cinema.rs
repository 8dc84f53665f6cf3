use serde::{Deserialize, Serialize};

pub type MovieId = u32;
pub type CinemaHallId = u32;
pub type ShowId = u32;
pub type BookingId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A venue in a city. `shows` lists the shows scheduled here in the order
/// they were added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaHall {
    pub id: CinemaHallId,
    pub name: String,
    pub city: String,
    pub shows: Vec<ShowId>,
}

impl CinemaHall {
    pub fn new(id: CinemaHallId, name: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: city.into(),
            shows: Vec::new(),
        }
    }

    pub fn is_in_city(&self, city: &str) -> bool {
        self.city.to_lowercase() == city.to_lowercase()
    }
}
