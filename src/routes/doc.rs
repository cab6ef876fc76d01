use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{Cart, CartLine, UpdateQuantityRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        profile::UpdateProfileRequest,
    },
    models::{CartItem, Category, Product, Profile, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, params, products, profile},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        categories::list_categories,
        categories::get_category,
        categories::list_category_products,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        profile::get_profile,
        profile::update_profile,
        cart::get_cart,
        cart::add_to_cart,
        cart::update_quantity,
        cart::clear_cart,
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            Profile,
            CartItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            UpdateProfileRequest,
            UpdateQuantityRequest,
            Cart,
            CartLine,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Profile>,
            ApiResponse<Cart>,
            ApiResponse<CartItem>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Profile", description = "Profile endpoints"),
        (name = "Cart", description = "Shopping cart endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
