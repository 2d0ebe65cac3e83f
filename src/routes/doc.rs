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
        admin::{CreateAgencyRequest, DeleteSpaceResponse, UpdateCredentialsRequest, UserList},
        auth::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest},
        bookings::{
            BookingAction, BookingList, BookingWithSpace, BookingWithSpaceList, CheckoutRequest,
            ManageBookingRequest,
        },
        cart::{AddToCartRequest, CartLine, CartList, CartSummary},
        favorites::{AddFavoriteRequest, FavoriteSpaceList},
        insights::{RecommendationList, RecommendationRequest, ScoredSpace, TrendingLocations},
        spaces::{
            AvailabilityResponse, CreateSpaceRequest, SpaceDetail, SpaceList, SpaceOwner,
            ToggleAvailabilityRequest, UpdateSpaceRequest,
        },
    },
    models::{AdSpace, Booking, CartItem, Favorite, Review, SpaceSummary, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, bookings, cart, favorites, health, insights, params, spaces},
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
        auth::me,
        spaces::list_spaces,
        spaces::get_space,
        spaces::create_space,
        spaces::update_space,
        spaces::toggle_availability,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        bookings::checkout,
        bookings::list_bookings,
        bookings::incoming_bookings,
        bookings::get_booking,
        bookings::manage_booking,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        insights::trending_locations,
        insights::recommendations,
        admin::list_users,
        admin::create_agency,
        admin::update_credentials,
        admin::list_all_bookings,
        admin::delete_space
    ),
    components(
        schemas(
            User,
            AdSpace,
            SpaceSummary,
            Booking,
            Review,
            CartItem,
            Favorite,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            CreateSpaceRequest,
            UpdateSpaceRequest,
            ToggleAvailabilityRequest,
            AvailabilityResponse,
            SpaceList,
            SpaceOwner,
            SpaceDetail,
            AddToCartRequest,
            CartLine,
            CartSummary,
            CartList,
            CheckoutRequest,
            BookingAction,
            ManageBookingRequest,
            BookingList,
            BookingWithSpace,
            BookingWithSpaceList,
            AddFavoriteRequest,
            FavoriteSpaceList,
            TrendingLocations,
            RecommendationRequest,
            ScoredSpace,
            RecommendationList,
            CreateAgencyRequest,
            UpdateCredentialsRequest,
            UserList,
            DeleteSpaceResponse,
            params::Pagination,
            params::SpaceQuery,
            params::BookingListQuery,
            Meta,
            ApiResponse<AdSpace>,
            ApiResponse<SpaceList>,
            ApiResponse<SpaceDetail>,
            ApiResponse<BookingList>,
            ApiResponse<BookingWithSpaceList>,
            ApiResponse<CartList>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Spaces", description = "Ad space endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Bookings", description = "Booking endpoints"),
        (name = "Favorites", description = "Wishlist endpoints"),
        (name = "Insights", description = "Trending locations and the campaign wizard"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
