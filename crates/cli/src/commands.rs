//! CLI commands

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use storefront_client::catalog::{Availability, PriceRange};
use storefront_client::validation::{ProductForm, check_upload_size};
use storefront_client::{
    CatalogFilter, ClientConfig, Facets, LoginRequest, Product, ProductQuery, SessionController,
    SignupRequest, SortOrder, StorefrontClient,
};
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in
    Login(Credentials),

    /// Sign in to an admin account
    AdminLogin(Credentials),

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Browse and manage products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        command: WishlistCommands,
    },

    /// Manage accounts (admin)
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Upload product images and print their URLs (admin)
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
pub struct Credentials {
    #[arg(long)]
    email: String,

    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

impl From<Credentials> for LoginRequest {
    fn from(credentials: Credentials) -> Self {
        Self {
            email: credentials.email,
            password: credentials.password,
        }
    }
}

#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products, filtered and sorted like the listing page
    List(ListArgs),

    /// Show one product
    Show { id: String },

    /// Create a product (admin)
    Create(ProductArgs),

    /// Replace a product (admin)
    Update {
        id: String,

        #[command(flatten)]
        product: ProductArgs,
    },

    /// Delete a product (admin)
    Delete { id: String },
}

#[derive(Args)]
pub struct ListArgs {
    /// featured, name-asc, name-desc, price-asc, price-desc or newest
    #[arg(long, default_value = "featured")]
    sort: SortOrder,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    #[arg(long = "category")]
    categories: Vec<String>,

    #[arg(long = "brand")]
    brands: Vec<String>,

    #[arg(long = "color")]
    colors: Vec<String>,

    #[arg(long = "size")]
    sizes: Vec<String>,

    #[arg(long)]
    in_stock: bool,

    #[arg(long)]
    out_of_stock: bool,

    /// Print the available filter values instead of the products
    #[arg(long)]
    facets: bool,
}

impl ListArgs {
    fn query(&self) -> ProductQuery {
        ProductQuery {
            sort: self.sort,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    fn filter(&self) -> CatalogFilter {
        let set = |values: &[String]| values.iter().cloned().collect::<BTreeSet<_>>();
        CatalogFilter {
            categories: set(&self.categories),
            brands: set(&self.brands),
            colors: set(&self.colors),
            sizes: set(&self.sizes),
            availability: Availability {
                in_stock: self.in_stock,
                out_of_stock: self.out_of_stock,
            },
            price: PriceRange {
                from: self.min_price,
                to: self.max_price,
            },
        }
    }
}

#[derive(Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    category: String,

    #[arg(long)]
    brand: String,

    #[arg(long)]
    price: String,

    #[arg(long)]
    description: String,

    #[arg(long, default_value = "")]
    stock: String,

    /// Comma-separated colors
    #[arg(long, default_value = "")]
    colors: String,

    /// Comma-separated sizes
    #[arg(long, default_value = "")]
    sizes: String,

    /// Image URL already hosted
    #[arg(long = "image")]
    images: Vec<String>,

    /// Local image to upload first
    #[arg(long = "upload")]
    uploads: Vec<PathBuf>,
}

impl ProductArgs {
    async fn into_form(self, client: &StorefrontClient) -> Result<ProductForm> {
        let mut images = self.images;
        images.extend(upload_files(client, &self.uploads).await?);

        Ok(ProductForm {
            name: self.name,
            category: self.category,
            brand: self.brand,
            price: self.price,
            description: self.description,
            stock: self.stock,
            colors: self.colors,
            sizes: self.sizes,
            images,
        })
    }
}

#[derive(Subcommand)]
pub enum WishlistCommands {
    /// Show the wishlist
    List,

    /// Add a product
    Add { product_id: String },

    /// Remove a product
    Remove { product_id: String },

    /// Whether a product is on the wishlist
    Check { product_id: String },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all accounts
    List,

    /// Delete an account
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a configuration file with the defaults
    Init {
        /// Output file path (defaults to the data directory's config.toml)
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    pub async fn execute(self, settings: ClientConfig) -> Result<()> {
        match self {
            Self::Config { command } => command.execute(),
            command => command.run(&SessionController::from_config(&settings)?).await,
        }
    }

    async fn run(self, session: &SessionController) -> Result<()> {
        let client = session.client();

        match self {
            Self::Login(credentials) => {
                let user = session.login(&credentials.into()).await?;
                println!("Signed in as {} <{}>", user.name, user.email);
            }
            Self::AdminLogin(credentials) => {
                let user = session.admin_login(&credentials.into()).await?;
                println!("Signed in as administrator {} <{}>", user.name, user.email);
            }
            Self::Signup {
                name,
                email,
                password,
            } => {
                session
                    .signup(&SignupRequest {
                        name,
                        email,
                        password,
                    })
                    .await?;
                println!("Account created. Run `storefront login` to sign in.");
            }
            Self::Logout => {
                session.logout().await;
                println!("Signed out");
            }
            Self::Whoami => match session.restore().await.user() {
                Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
                None => println!("Not signed in"),
            },
            Self::Products { command } => command.execute(client).await?,
            Self::Wishlist { command } => command.execute(client).await?,
            Self::Users { command } => command.execute(client).await?,
            Self::Upload { files } => {
                for url in upload_files(client, &files).await? {
                    println!("{url}");
                }
            }
            Self::Config { command } => command.execute()?,
        }

        Ok(())
    }
}

impl ProductCommands {
    pub async fn execute(self, client: &StorefrontClient) -> Result<()> {
        match self {
            Self::List(args) => {
                let products = client.list_products(&args.query()).await?;
                if args.facets {
                    print_facets(&Facets::from_products(&products));
                } else {
                    let shown = args.filter().apply(&products, args.sort);
                    info!(fetched = products.len(), shown = shown.len(), "Products listed");
                    for product in &shown {
                        print_product_line(product);
                    }
                }
            }
            Self::Show { id } => {
                let product = client.get_product(&id).await?;
                println!("{}", serde_json::to_string_pretty(&product)?);
            }
            Self::Create(args) => {
                let input = args.into_form(client).await?.into_input()?;
                let product = client.create_product(&input).await?;
                println!("Created product {}", product.id);
            }
            Self::Update { id, product } => {
                let input = product.into_form(client).await?.into_input()?;
                client.update_product(&id, &input).await?;
                println!("Updated product {id}");
            }
            Self::Delete { id } => {
                client.delete_product(&id).await?;
                println!("Deleted product {id}");
            }
        }
        Ok(())
    }
}

impl WishlistCommands {
    pub async fn execute(self, client: &StorefrontClient) -> Result<()> {
        match self {
            Self::List => {
                let items = client.wishlist().await?;
                if items.is_empty() {
                    println!("Your wishlist is empty");
                }
                for item in &items {
                    print_product_line(&item.product);
                }
            }
            Self::Add { product_id } => {
                client.add_to_wishlist(&product_id).await?;
                println!("Added {product_id} to the wishlist");
            }
            Self::Remove { product_id } => {
                client.remove_from_wishlist(&product_id).await?;
                println!("Removed {product_id} from the wishlist");
            }
            Self::Check { product_id } => {
                let listed = client.is_in_wishlist(&product_id).await?;
                println!("{}", if listed { "yes" } else { "no" });
            }
        }
        Ok(())
    }
}

impl UserCommands {
    pub async fn execute(self, client: &StorefrontClient) -> Result<()> {
        match self {
            Self::List => {
                for user in client.list_users().await? {
                    println!("{}\t{}\t{}\t{}", user.id, user.name, user.email, user.role);
                }
            }
            Self::Delete { id } => {
                client.delete_user(&id).await?;
                println!("Deleted user {id}");
            }
        }
        Ok(())
    }
}

impl ConfigCommands {
    pub fn execute(self) -> Result<()> {
        match self {
            Self::Init { output, force } => {
                let config_path = output.unwrap_or_else(config::default_config_path);
                config::generate_default_config(&config_path, force)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}

async fn upload_files(client: &StorefrontClient, files: &[PathBuf]) -> Result<Vec<String>> {
    // Check every size before uploading anything
    for path in files {
        let len = std::fs::metadata(path)
            .with_context(|| format!("Cannot read {}", path.display()))?
            .len();
        check_upload_size(usize::try_from(len).unwrap_or(usize::MAX))?;
    }

    let mut urls = Vec::with_capacity(files.len());
    for path in files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?;
        urls.push(client.upload_image(&file_name(path), bytes).await?);
    }
    Ok(urls)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned())
}

fn print_product_line(product: &Product) {
    let availability = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "out of stock".to_string()
    };
    println!(
        "{}\t{}\t{:.2}\t{}",
        product.id, product.name, product.price, availability
    );
}

fn print_facets(facets: &Facets) {
    let rows = [
        ("Categories", &facets.categories),
        ("Brands", &facets.brands),
        ("Colors", &facets.colors),
        ("Sizes", &facets.sizes),
    ];
    for (label, values) in rows {
        println!("{label}: {}", values.join(", "));
    }
}
