use autorent_core::{Car, PLACEHOLDER_IMAGE};

const DEFAULT_SEATS: u32 = 4;

struct SeedCar {
    id: i64,
    make: &'static str,
    model: &'static str,
    year: i32,
    car_type: &'static str,
    seats: Option<u32>,
    price: f64,
    price_per_day: Option<f64>,
    image: Option<&'static str>,
}

// Prices are INR per day.
const SEED_CARS: &[SeedCar] = &[
    SeedCar {
        id: 1,
        make: "Maruti Suzuki",
        model: "Swift",
        year: 2022,
        car_type: "Hatchback",
        seats: Some(5),
        price: 1000.0,
        price_per_day: None,
        image: Some("/cars/maruti_swift.svg"),
    },
    SeedCar {
        id: 2,
        make: "Hyundai",
        model: "Creta",
        year: 2023,
        car_type: "SUV",
        seats: Some(5),
        price: 2200.0,
        price_per_day: Some(2000.0),
        image: Some("/cars/hyundai-creta.svg"),
    },
    SeedCar {
        id: 3,
        make: "Tata",
        model: "Nexon",
        year: 2023,
        car_type: "SUV",
        seats: Some(5),
        price: 1800.0,
        price_per_day: None,
        image: Some("/cars/tata_nexon.png"),
    },
    SeedCar {
        id: 4,
        make: "Honda",
        model: "City",
        year: 2021,
        car_type: "Sedan",
        seats: Some(5),
        price: 1500.0,
        price_per_day: None,
        image: Some("/cars/honda_city.svg"),
    },
    SeedCar {
        id: 5,
        make: "Mahindra",
        model: "XUV700",
        year: 2023,
        car_type: "SUV",
        seats: Some(7),
        price: 3000.0,
        price_per_day: None,
        image: Some("/cars/mahindra_xuv700.svg"),
    },
    SeedCar {
        id: 6,
        make: "Toyota",
        model: "Innova Crysta",
        year: 2022,
        car_type: "MPV",
        seats: Some(7),
        price: 2800.0,
        price_per_day: Some(2600.0),
        image: Some("/cars/toyota-innova.jpg"),
    },
    SeedCar {
        id: 7,
        make: "Kia",
        model: "Seltos",
        year: 2022,
        car_type: "SUV",
        seats: Some(5),
        price: 2100.0,
        price_per_day: None,
        image: None,
    },
    SeedCar {
        id: 8,
        make: "Mahindra",
        model: "Thar",
        year: 2023,
        car_type: "Off-road",
        seats: None,
        price: 2500.0,
        price_per_day: None,
        image: Some("/cars/mahindra_thar.svg"),
    },
];

impl SeedCar {
    fn to_car(&self) -> Car {
        Car {
            id: self.id,
            make: self.make.to_string(),
            model: self.model.to_string(),
            year: self.year,
            car_type: self.car_type.to_string(),
            seats: self.seats.unwrap_or(DEFAULT_SEATS),
            price: self.price,
            price_per_day: self.price_per_day.unwrap_or(self.price),
            image: self.image.unwrap_or(PLACEHOLDER_IMAGE).to_string(),
        }
    }
}

/// The built-in fleet with defaults applied, ascending id.
pub fn seed_cars() -> Vec<Car> {
    SEED_CARS.iter().map(SeedCar::to_car).collect()
}

/// Seeded image for `id`, or the placeholder for cars outside the seed list.
pub fn seed_image(id: i64) -> String {
    SEED_CARS
        .iter()
        .find(|c| c.id == id)
        .and_then(|c| c.image)
        .unwrap_or(PLACEHOLDER_IMAGE)
        .to_string()
}
