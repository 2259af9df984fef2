use actix_web::http::header;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::Auth;
use crate::cart;
use crate::catalog::Catalog;
use crate::error::StoreError;
use crate::middleware::RequireLogin;
use crate::models::{
    AuthResponse, CheckoutPreview, NewCategory, NewProduct, OrderDetails, Product, SearchQuery, SignInInput,
    SignUpInput, Storefront,
};
use crate::orders::{price_order, Orders};
use crate::session::{session_cookie, Session, SessionKeys};

type HandlerResult = Result<HttpResponse, StoreError>;

// Store calls touch the filesystem and a shared lock, so they run on the blocking pool
async fn blocking<R, F>(f: F) -> Result<R, StoreError>
where
    F: FnOnce() -> Result<R, StoreError> + Send + 'static,
    R: Send + 'static,
{
    web::block(f).await?
}

fn current_session(req: &HttpRequest) -> Session {
    req.extensions().get::<Session>().cloned().unwrap_or_default()
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn redirect_with_session(location: &str, keys: &SessionKeys, session: &Session) -> HandlerResult {
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .cookie(keys.cookie(session)?)
        .finish())
}

fn preview(items: Vec<Product>) -> HttpResponse {
    let total = price_order(&items);
    HttpResponse::Ok().json(CheckoutPreview { items, total })
}

async fn index(catalog: web::Data<Catalog>, query: web::Query<SearchQuery>) -> HandlerResult {
    let search_query = query.q.as_deref().unwrap_or("").trim().to_lowercase();
    let storefront = blocking(move || {
        Ok(Storefront {
            products: catalog.list_products(Some(&search_query)),
            categories: catalog.list_categories(),
            search_query,
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(storefront))
}

async fn product_list(catalog: web::Data<Catalog>) -> HandlerResult {
    let products = blocking(move || Ok(catalog.list_products(None))).await?;
    Ok(HttpResponse::Ok().json(products))
}

async fn view_product(catalog: web::Data<Catalog>, product_id: web::Path<i64>) -> HandlerResult {
    let product_id = product_id.into_inner();
    let product = blocking(move || catalog.get_product(product_id)).await?;
    Ok(HttpResponse::Ok().json(product))
}

async fn category_list(catalog: web::Data<Catalog>) -> HandlerResult {
    let categories = blocking(move || Ok(catalog.list_categories())).await?;
    Ok(HttpResponse::Ok().json(categories))
}

async fn view_cart(catalog: web::Data<Catalog>, req: HttpRequest) -> HandlerResult {
    let session = current_session(&req);
    let items = blocking(move || Ok(cart::get_items(&session, &catalog))).await?;
    Ok(preview(items))
}

async fn add_to_cart(
    catalog: web::Data<Catalog>,
    keys: web::Data<SessionKeys>,
    product_id: web::Path<i64>,
    req: HttpRequest,
) -> HandlerResult {
    let product_id = product_id.into_inner();
    let product = blocking(move || catalog.get_product(product_id)).await?;
    let mut session = current_session(&req);
    cart::add_item(&mut session, product.id);
    redirect_with_session("/cart", &keys, &session)
}

async fn single_item_form(catalog: web::Data<Catalog>, product_id: web::Path<i64>) -> HandlerResult {
    let product_id = product_id.into_inner();
    let product = blocking(move || catalog.get_product(product_id)).await?;
    Ok(preview(vec![product]))
}

// Buying one product directly never touches the cart
async fn buy_single_item(
    catalog: web::Data<Catalog>,
    orders: web::Data<Orders>,
    product_id: web::Path<i64>,
    details: Option<web::Json<OrderDetails>>,
) -> HandlerResult {
    let product_id = product_id.into_inner();
    let details = details.map(web::Json::into_inner).unwrap_or_default();
    let record = blocking(move || {
        let product = catalog.get_product(product_id)?;
        orders.place_order(vec![product], details)
    })
    .await?;
    Ok(HttpResponse::Created().json(record))
}

async fn cart_checkout_form(catalog: web::Data<Catalog>, req: HttpRequest) -> HandlerResult {
    let session = current_session(&req);
    if session.cart.is_empty() {
        return Ok(redirect("/cart"));
    }
    let items = blocking(move || Ok(cart::get_items(&session, &catalog))).await?;
    Ok(preview(items))
}

async fn place_cart_order(
    catalog: web::Data<Catalog>,
    orders: web::Data<Orders>,
    keys: web::Data<SessionKeys>,
    details: Option<web::Json<OrderDetails>>,
    req: HttpRequest,
) -> HandlerResult {
    let mut session = current_session(&req);
    if session.cart.is_empty() {
        return Ok(redirect("/cart"));
    }

    let details = details.map(web::Json::into_inner).unwrap_or_default();
    let cart_session = session.clone();
    let record = blocking(move || {
        let items = cart::get_items(&cart_session, &catalog);
        orders.place_order(items, details)
    })
    .await?;
    cart::clear(&mut session);

    Ok(HttpResponse::Created()
        .cookie(keys.cookie(&session)?)
        .json(record))
}

async fn add_product(catalog: web::Data<Catalog>, data: Option<web::Json<NewProduct>>) -> HandlerResult {
    let input = data.map(web::Json::into_inner).unwrap_or_default();
    let product = blocking(move || catalog.add_product(input)).await?;
    Ok(HttpResponse::Created().json(product))
}

async fn add_category(catalog: web::Data<Catalog>, data: Option<web::Json<NewCategory>>) -> HandlerResult {
    let input = data.map(web::Json::into_inner).unwrap_or_default();
    let category = blocking(move || catalog.add_category(input)).await?;
    Ok(HttpResponse::Created().json(category))
}

async fn my_purchases(orders: web::Data<Orders>) -> HandlerResult {
    let ledger = blocking(move || Ok(orders.list_orders())).await?;
    Ok(HttpResponse::Ok().json(ledger))
}

async fn cancel_purchase(orders: web::Data<Orders>, purchase_index: web::Path<usize>) -> HandlerResult {
    let index = purchase_index.into_inner();
    blocking(move || orders.cancel_order(index)).await?;
    Ok(redirect("/my_purchases"))
}

async fn cancel_purchase_by_id(orders: web::Data<Orders>, purchase_id: web::Path<Uuid>) -> HandlerResult {
    let id = purchase_id.into_inner();
    if blocking(move || orders.cancel_order_by_id(id)).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(StoreError::NotFound("Purchase"))
    }
}

async fn sign_in(
    auth: web::Data<Auth>,
    keys: web::Data<SessionKeys>,
    data: Option<web::Json<SignInInput>>,
    req: HttpRequest,
) -> HandlerResult {
    let input = data.map(web::Json::into_inner).unwrap_or_default();
    let username = input.username.unwrap_or_default();
    let password = input.password.unwrap_or_default();

    let session = current_session(&req);
    let (session, username) = blocking(move || {
        let mut session = session;
        auth.login(&mut session, &username, &password)?;
        Ok((session, username))
    })
    .await?;

    let token = keys.issue(&session)?;
    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token.clone()))
        .json(AuthResponse { token, username }))
}

async fn sign_out(keys: web::Data<SessionKeys>, req: HttpRequest) -> HandlerResult {
    let mut session = current_session(&req);
    Auth::logout(&mut session);
    redirect_with_session("/", &keys, &session)
}

async fn sign_up(auth: web::Data<Auth>, new_user: Option<web::Json<SignUpInput>>) -> HandlerResult {
    let input = new_user.map(web::Json::into_inner).unwrap_or_default();
    let user = blocking(move || auth.register(input)).await?;
    Ok(HttpResponse::Created().json(json!({ "username": user.username })))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/products", web::get().to(product_list))
        .route("/product/{product_id}", web::get().to(view_product))
        .route("/categories", web::get().to(category_list))
        .route("/cart", web::get().to(view_cart))
        .service(
            web::resource("/add_to_cart/{product_id}")
                .route(web::get().to(add_to_cart))
                .route(web::post().to(add_to_cart)),
        )
        .service(
            web::resource("/buy_now/{product_id}")
                .route(web::get().to(single_item_form))
                .route(web::post().to(buy_single_item)),
        )
        .route("/place_order", web::post().to(place_cart_order))
        .service(
            web::resource("/checkout")
                .wrap(RequireLogin)
                .route(web::get().to(cart_checkout_form))
                .route(web::post().to(place_cart_order)),
        )
        .service(
            web::resource("/checkout_single/{product_id}")
                .wrap(RequireLogin)
                .route(web::get().to(single_item_form))
                .route(web::post().to(buy_single_item)),
        )
        .service(
            web::resource("/add_product")
                .wrap(RequireLogin)
                .route(web::post().to(add_product)),
        )
        .service(
            web::resource("/add_category")
                .wrap(RequireLogin)
                .route(web::post().to(add_category)),
        )
        .route("/my_purchases", web::get().to(my_purchases))
        .route("/cancel_purchase/{purchase_index}", web::post().to(cancel_purchase))
        .route("/purchases/{purchase_id}", web::delete().to(cancel_purchase_by_id))
        .route("/login", web::post().to(sign_in))
        .route("/logout", web::get().to(sign_out))
        .route("/register", web::post().to(sign_up));
}
