//! Jamaican towns used by the comparison backend, with approximate centres.

use route_compare::Coordinate;

#[derive(Debug, Clone, Copy)]
pub struct Town {
    pub id: &'static str,
    pub name: &'static str,
    pub position: Coordinate,
}

impl Town {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            id,
            name,
            position: Coordinate::new(lat, lng),
        }
    }
}

pub const KINGSTON: Town = Town::new("kingston", "Kingston", 17.9714, -76.7920);
pub const SPANISH_TOWN: Town = Town::new("spanish_town", "Spanish Town", 17.9911, -76.9574);
pub const MAY_PEN: Town = Town::new("may_pen", "May Pen", 17.9646, -77.2450);
pub const MANDEVILLE: Town = Town::new("mandeville", "Mandeville", 18.0412, -77.5071);
pub const MONTEGO_BAY: Town = Town::new("montego_bay", "Montego Bay", 18.4762, -77.8939);
pub const OCHO_RIOS: Town = Town::new("ocho_rios", "Ocho Rios", 18.4075, -77.1031);
pub const NEGRIL: Town = Town::new("negril", "Negril", 18.2683, -78.3481);

/// Kingston to Montego Bay through the south coast towns.
pub const SOUTH_COAST: &[Town] = &[KINGSTON, SPANISH_TOWN, MAY_PEN, MANDEVILLE, MONTEGO_BAY];

/// Kingston to Montego Bay over the north coast.
pub const NORTH_COAST: &[Town] = &[KINGSTON, SPANISH_TOWN, OCHO_RIOS, MONTEGO_BAY];

pub fn positions(towns: &[Town]) -> Vec<Coordinate> {
    towns.iter().map(|town| town.position).collect()
}

pub fn names(towns: &[Town]) -> Vec<&'static str> {
    towns.iter().map(|town| town.name).collect()
}
