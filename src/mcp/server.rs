//! Foodgram MCP Server Implementation
//!
//! Exposes the recipe, social and shopping list operations as MCP tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::Database;
use crate::models::{
    CompositionEntryCreate, IngredientCreate, RecipeCreate, RecipeFilter, RecipeUpdate,
    TagCreate, UserCreate,
};
use crate::tools::status::StatusTracker;
use crate::tools::{catalog, recipes, shopping, social, users, ServiceError};

/// Foodgram MCP Service
#[derive(Clone)]
pub struct FoodgramService {
    status_tracker: Arc<StatusTracker>,
    database: Database,
    page_size: i64,
    tool_router: ToolRouter<FoodgramService>,
}

impl FoodgramService {
    pub fn new(config: &Config, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(StatusTracker::new(config.database_path.clone())),
            database,
            page_size: config.page_size,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_mcp_error(e: ServiceError) -> McpError {
    match e {
        ServiceError::Database(_) => McpError::internal_error(e.to_string(), None),
        ServiceError::Shopping(crate::shopping::ShoppingError::Database(_))
        | ServiceError::Shopping(crate::shopping::ShoppingError::AggregationOverflow { .. }) => {
            McpError::internal_error(e.to_string(), None)
        }
        _ => McpError::invalid_params(e.to_string(), None),
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    success: bool,
}

// ============================================================================
// User Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateUserParams {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetUserParams {
    /// User to look up
    pub id: i64,
    /// Acting user, used for the is_subscribed flag (optional)
    pub viewer_id: Option<i64>,
}

// ============================================================================
// Catalog Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateTagParams {
    pub name: String,
    /// Hex colour like #E26C2D (default #ffffff)
    pub color: Option<String>,
    /// Unique slug: letters, digits, '-' and '_'
    pub slug: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateIngredientParams {
    pub name: String,
    /// Unit stored as-is, e.g. "g", "ml", "pcs"
    pub measurement_unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    /// Case-insensitive name prefix (optional)
    pub name: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IngredientAmountParam {
    /// Catalog ingredient ID
    pub ingredient_id: i64,
    /// Positive integer amount in the ingredient's measurement unit
    pub amount: i64,
}

impl From<IngredientAmountParam> for CompositionEntryCreate {
    fn from(p: IngredientAmountParam) -> Self {
        Self {
            ingredient_id: p.ingredient_id,
            amount: p.amount,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    /// Author of the recipe
    pub user_id: i64,
    pub name: String,
    pub text: String,
    /// Cooking time in minutes (at least 1)
    pub cooking_time: i64,
    /// Image reference (optional)
    pub image: Option<String>,
    /// Tag IDs
    #[serde(default)]
    pub tags: Vec<i64>,
    pub ingredients: Vec<IngredientAmountParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    pub id: i64,
    /// Acting user for is_favorited / is_in_shopping_cart (optional)
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesParams {
    /// Acting user for membership flags and filters (optional)
    pub user_id: Option<i64>,
    /// Only recipes by this author
    pub author_id: Option<i64>,
    /// Only recipes carrying any of these tag slugs
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only the acting user's favourites
    #[serde(default)]
    pub is_favorited: bool,
    /// Only recipes in the acting user's shopping cart
    #[serde(default)]
    pub is_in_shopping_cart: bool,
    /// 1-based page number (default 1)
    #[serde(default = "default_page")]
    pub page: i64,
    /// Page size (default from server configuration)
    pub limit: Option<i64>,
}

fn default_page() -> i64 { 1 }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    /// Acting user; must be the author
    pub user_id: i64,
    pub id: i64,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub image: Option<String>,
    /// Replaces all tags when given
    pub tags: Option<Vec<i64>>,
    /// Replaces all ingredients when given
    pub ingredients: Option<Vec<IngredientAmountParam>>,
}

/// Acting user + recipe, used by delete and membership tools
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserRecipeParams {
    pub user_id: i64,
    pub recipe_id: i64,
}

// ============================================================================
// Social / Shopping Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SubscribeParams {
    pub user_id: i64,
    /// Author to follow or unfollow
    pub author_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: i64,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl FoodgramService {
    // --- Status ---

    #[tool(description = "Get the current status of the Foodgram service including build info, database status, and process information")]
    fn foodgram_status(&self) -> Result<CallToolResult, McpError> {
        let status = self.status_tracker.get_status(&self.database).map_err(to_mcp_error)?;
        json_result(&status)
    }

    #[tool(description = "Get instructions for planning recipes and producing a shopping list. Call this before using the shopping cart tools.")]
    fn shopping_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SHOPPING_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SHOPPING_INSTRUCTIONS)]))
    }

    // --- Users ---

    #[tool(description = "Register a user. Returns the user with an API token for the HTTP API.")]
    fn create_user(&self, Parameters(p): Parameters<CreateUserParams>) -> Result<CallToolResult, McpError> {
        let data = UserCreate {
            email: p.email, username: p.username, first_name: p.first_name, last_name: p.last_name,
        };
        let result = users::create_user(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a user profile")]
    fn get_user(&self, Parameters(p): Parameters<GetUserParams>) -> Result<CallToolResult, McpError> {
        let result = users::get_user(&self.database, p.id, p.viewer_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Catalog ---

    #[tool(description = "Create a recipe tag with a unique slug")]
    fn create_tag(&self, Parameters(p): Parameters<CreateTagParams>) -> Result<CallToolResult, McpError> {
        let data = TagCreate {
            name: p.name,
            color: p.color.unwrap_or_else(crate::models::default_color),
            slug: p.slug,
        };
        let result = catalog::create_tag(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List all tags")]
    fn list_tags(&self) -> Result<CallToolResult, McpError> {
        let result = catalog::list_tags(&self.database).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Add an ingredient (name + measurement unit) to the catalog")]
    fn create_ingredient(&self, Parameters(p): Parameters<CreateIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientCreate { name: p.name, measurement_unit: p.measurement_unit };
        let result = catalog::create_ingredient(&self.database, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List catalog ingredients, optionally by name prefix")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = catalog::list_ingredients(&self.database, p.name.as_deref()).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe with tags and ingredient amounts")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            name: p.name, text: p.text, cooking_time: p.cooking_time, image: p.image, tags: p.tags,
            ingredients: p.ingredients.into_iter().map(Into::into).collect(),
        };
        let result = recipes::create_recipe(&self.database, p.user_id, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with tags, author, ingredients and membership flags")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "List recipes newest first with optional author, tag and membership filters")]
    fn list_recipes(&self, Parameters(p): Parameters<ListRecipesParams>) -> Result<CallToolResult, McpError> {
        let filter = RecipeFilter {
            author_id: p.author_id,
            tag_slugs: p.tags,
            viewer_id: p.user_id,
            is_favorited: p.is_favorited,
            is_in_shopping_cart: p.is_in_shopping_cart,
        };
        let limit = p.limit.unwrap_or(self.page_size);
        let result = recipes::list_recipes(&self.database, &filter, p.page, limit).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a recipe. Only the author may update. Given tags/ingredients replace the old ones entirely.")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeUpdate {
            name: p.name, text: p.text, cooking_time: p.cooking_time, image: p.image, tags: p.tags,
            ingredients: p.ingredients.map(|items| items.into_iter().map(Into::into).collect()),
        };
        let result = recipes::update_recipe(&self.database, p.user_id, p.id, data).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe. Only the author may delete.")]
    fn delete_recipe(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        recipes::delete_recipe(&self.database, p.user_id, p.recipe_id).map_err(to_mcp_error)?;
        json_result(&DeletedResponse { success: true })
    }

    // --- Favourites & Subscriptions ---

    #[tool(description = "Add a recipe to the user's favourites (rejected if already there)")]
    fn add_favorite(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = social::add_favorite(&self.database, p.user_id, p.recipe_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove a recipe from the user's favourites")]
    fn remove_favorite(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        social::remove_favorite(&self.database, p.user_id, p.recipe_id).map_err(to_mcp_error)?;
        json_result(&DeletedResponse { success: true })
    }

    #[tool(description = "Subscribe the user to an author. Self and duplicate subscriptions are rejected.")]
    fn subscribe(&self, Parameters(p): Parameters<SubscribeParams>) -> Result<CallToolResult, McpError> {
        let result = social::subscribe(&self.database, p.user_id, p.author_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Unsubscribe the user from an author")]
    fn unsubscribe(&self, Parameters(p): Parameters<SubscribeParams>) -> Result<CallToolResult, McpError> {
        social::unsubscribe(&self.database, p.user_id, p.author_id).map_err(to_mcp_error)?;
        json_result(&DeletedResponse { success: true })
    }

    #[tool(description = "List authors the user follows, with their recipes")]
    fn list_subscriptions(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = social::list_subscriptions(&self.database, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    // --- Shopping Cart ---

    #[tool(description = "Add a recipe to the user's shopping cart. Adding the same recipe twice is an error.")]
    fn add_to_shopping_cart(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = shopping::add_to_shopping_cart(&self.database, p.user_id, p.recipe_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove a recipe from the user's shopping cart")]
    fn remove_from_shopping_cart(&self, Parameters(p): Parameters<UserRecipeParams>) -> Result<CallToolResult, McpError> {
        shopping::remove_from_shopping_cart(&self.database, p.user_id, p.recipe_id).map_err(to_mcp_error)?;
        json_result(&DeletedResponse { success: true })
    }

    #[tool(description = "List recipes in the user's shopping cart, most recently added first")]
    fn list_shopping_cart(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = shopping::list_shopping_cart(&self.database, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the aggregated shopping list: one line per ingredient name and unit, amounts summed across planned recipes")]
    fn get_shopping_list(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = shopping::get_shopping_list(&self.database, p.user_id).map_err(to_mcp_error)?;
        json_result(&result)
    }

    #[tool(description = "Render the aggregated shopping list as the cart.txt text download")]
    fn render_shopping_list(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = shopping::render_shopping_list(&self.database, p.user_id).map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(result.body)]))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FoodgramService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "foodgram".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Foodgram".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Foodgram - recipe sharing and shopping lists. \
                 Call shopping_instructions before planning a shopping trip. \
                 Users: create_user/get_user. Catalog: create_tag/list_tags, create_ingredient/list_ingredients. \
                 Recipes: create/get/list/update/delete_recipe. \
                 Social: add/remove_favorite, subscribe/unsubscribe, list_subscriptions. \
                 Shopping: add_to/remove_from/list_shopping_cart, get_shopping_list, render_shopping_list."
                    .into(),
            ),
        }
    }
}
