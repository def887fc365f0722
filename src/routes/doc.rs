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
        auth::{ChangePasswordRequest, LoginRequest, LoginResponse},
        bills::{
            AddItemsRequest, ApplyPromotionRequest, BillLineRequest, BillList, BillWithItems,
            DiscountRequest, OpenBillRequest, UpdateItemRequest,
        },
        cart::{AddToCartRequest, CartItemDto, CartList, PlaceOrderRequest, UpdateCartRequest},
        categories::{CategoryList, CategoryRequest},
        foods::{AvailabilityRequest, CreateFoodRequest, FoodList, UpdateFoodRequest},
        history::HistoryList,
        promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
        settings::{PutSettingRequest, SettingList},
        statistics::{DashboardSummary, Granularity, RevenueBucket, RevenueReport},
        tables::{CreateTableRequest, TableList, TableStatusRequest},
        users::{CreateUserRequest, UpdateProfileRequest, UpdateUserRequest, UserList},
    },
    models::{
        Bill, BillItem, CartItem, Category, Food, History, Promotion, Role, Setting, Table,
        TableStatus, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, bills, cart, categories, foods, health, history, params, promotions, settings,
        statistics, tables, users,
    },
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
        auth::login,
        auth::me,
        auth::update_profile,
        auth::change_password,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        foods::list_foods,
        foods::best_sellers,
        foods::get_food,
        foods::create_food,
        foods::update_food,
        foods::set_availability,
        foods::delete_food,
        tables::list_tables,
        tables::get_table,
        tables::get_table_bill,
        tables::create_table,
        tables::set_status,
        tables::delete_table,
        bills::list_bills,
        bills::open_bill,
        bills::get_bill,
        bills::add_items,
        bills::update_item,
        bills::remove_item,
        bills::apply_promotion,
        bills::set_discount,
        bills::mark_processed,
        bills::checkout,
        bills::delete_bill,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_quantity,
        cart::remove_from_cart,
        cart::clear_cart,
        cart::place_order,
        promotions::list_promotions,
        promotions::get_by_code,
        promotions::create_promotion,
        promotions::update_promotion,
        promotions::delete_promotion,
        history::list_history,
        settings::list_settings,
        settings::get_setting,
        settings::put_setting,
        settings::delete_setting,
        statistics::revenue,
        statistics::summary
    ),
    components(
        schemas(
            Role,
            TableStatus,
            User,
            Category,
            Food,
            Table,
            Bill,
            BillItem,
            CartItem,
            Promotion,
            History,
            Setting,
            LoginRequest,
            LoginResponse,
            ChangePasswordRequest,
            CreateUserRequest,
            UpdateUserRequest,
            UpdateProfileRequest,
            UserList,
            CategoryRequest,
            CategoryList,
            CreateFoodRequest,
            UpdateFoodRequest,
            AvailabilityRequest,
            FoodList,
            CreateTableRequest,
            TableStatusRequest,
            TableList,
            OpenBillRequest,
            BillLineRequest,
            AddItemsRequest,
            UpdateItemRequest,
            ApplyPromotionRequest,
            DiscountRequest,
            BillWithItems,
            BillList,
            AddToCartRequest,
            UpdateCartRequest,
            PlaceOrderRequest,
            CartItemDto,
            CartList,
            CreatePromotionRequest,
            UpdatePromotionRequest,
            PromotionList,
            HistoryList,
            PutSettingRequest,
            SettingList,
            Granularity,
            RevenueBucket,
            RevenueReport,
            DashboardSummary,
            params::Pagination,
            params::SortOrder,
            params::FoodSortBy,
            params::FoodQuery,
            params::BillListQuery,
            Meta,
            ApiResponse<Food>,
            ApiResponse<FoodList>,
            ApiResponse<BillWithItems>,
            ApiResponse<BillList>,
            ApiResponse<RevenueReport>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login and own profile"),
        (name = "Users", description = "Staff accounts"),
        (name = "Categories", description = "Menu categories"),
        (name = "Foods", description = "Menu items"),
        (name = "Tables", description = "Dining tables"),
        (name = "Bills", description = "Bills and their lines"),
        (name = "Cart", description = "Order drafting"),
        (name = "Promotions", description = "Discount codes"),
        (name = "History", description = "Action log"),
        (name = "Settings", description = "Shop configuration"),
        (name = "Statistics", description = "Revenue reports"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
