use crate::auth::models::Role;
use crate::catalog::models::NewProduct;

pub struct SeedUser {
    pub email: &'static str,
    pub full_name: &'static str,
    pub password: &'static str,
    pub roles: &'static [Role],
}

pub struct SeedProduct {
    pub title: &'static str,
    pub description: &'static str,
    pub price: f64,
    pub stock: i32,
    pub sizes: &'static [&'static str],
    pub gender: &'static str,
    pub tags: &'static [&'static str],
    pub images: &'static [&'static str],
}

impl SeedProduct {
    pub fn to_new_product(&self) -> NewProduct {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        NewProduct {
            title: self.title.to_string(),
            price: self.price,
            description: Some(self.description.to_string()),
            slug: None,
            stock: self.stock,
            sizes: owned(self.sizes),
            gender: self.gender.to_string(),
            tags: owned(self.tags),
            images: owned(self.images),
        }
    }
}

/// The first user owns every seeded product
pub const USERS: &[SeedUser] = &[
    SeedUser {
        email: "test1@google.com",
        full_name: "Test One",
        password: "Abc123",
        roles: &[Role::Admin, Role::User],
    },
    SeedUser {
        email: "test2@google.com",
        full_name: "Test Two",
        password: "Abc123",
        roles: &[Role::User],
    },
    SeedUser {
        email: "test3@google.com",
        full_name: "Test Three",
        password: "Abc123",
        roles: &[Role::User, Role::SuperUser],
    },
];

pub const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        title: "Men's Chill Crew Neck Sweatshirt",
        description: "Heavyweight crew neck sweatshirt with a soft brushed interior.",
        price: 75.0,
        stock: 7,
        sizes: &["XS", "S", "M", "L", "XL", "XXL"],
        gender: "men",
        tags: &["sweatshirt"],
        images: &["1740176-00-A_0_2000.jpg", "1740176-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Quilted Shirt Jacket",
        description: "Quilted shirt jacket with a relaxed fit and snap closures.",
        price: 200.0,
        stock: 5,
        sizes: &["XS", "S", "M", "XL", "XXL"],
        gender: "men",
        tags: &["jacket"],
        images: &["1740507-00-A_0_2000.jpg", "1740507-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Men's Raven Lightweight Zip Up Bomber Jacket",
        description: "Lightweight bomber with a water-repellent finish.",
        price: 130.0,
        stock: 10,
        sizes: &["S", "M", "L", "XL", "XXL"],
        gender: "men",
        tags: &["shirt"],
        images: &["1740250-00-A_0_2000.jpg", "1740250-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Women's Cropped Puffer Jacket",
        description: "Cropped puffer with a quilted body and stand collar.",
        price: 225.0,
        stock: 85,
        sizes: &["XS", "S", "M"],
        gender: "women",
        tags: &["hoodie"],
        images: &["1740535-00-A_0_2000.jpg", "1740535-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Women's Chill Half Zip Cropped Hoodie",
        description: "Half zip cropped hoodie in soft fleece.",
        price: 130.0,
        stock: 10,
        sizes: &["XS", "S", "M", "XXL"],
        gender: "women",
        tags: &["hoodie"],
        images: &["1740226-00-A_0_2000.jpg", "1740226-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Kids Cybertruck Long Sleeve Tee",
        description: "Long sleeve tee with a screen printed graphic on the front.",
        price: 30.0,
        stock: 10,
        sizes: &["XS", "S", "M"],
        gender: "kid",
        tags: &["shirt"],
        images: &["1742694-00-A_1_2000.jpg", "1742694-00-A_3.jpg"],
    },
    SeedProduct {
        title: "Kids Scribble T Logo Tee",
        description: "Crew neck tee with a scribbled logo print.",
        price: 25.0,
        stock: 0,
        sizes: &["XS", "S", "M"],
        gender: "kid",
        tags: &["shirt"],
        images: &["8529312-00-A_0_2000.jpg", "8529312-00-A_1.jpg"],
    },
    SeedProduct {
        title: "Relaxed T Logo Hat",
        description: "Six panel cap with an embroidered logo and adjustable strap.",
        price: 30.0,
        stock: 34,
        sizes: &["XS", "S", "M", "L", "XL", "XXL"],
        gender: "unisex",
        tags: &["hats"],
        images: &["1657932-00-A_0_2000.jpg", "1657932-00-A_1.jpg"],
    },
];
