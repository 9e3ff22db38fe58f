use askama::Template;
use axum::extract::{Path, Query, State};
use axum::http::header::REFERER;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::gate::{CreateCities, DeleteCities, Gate, ReadCities, UpdateCities};
use crate::db;
use crate::error::{AppError, FieldError};
use crate::flash;
use crate::listing::{parse_id_list, Page};
use crate::models::CityRow;
use crate::options::{mark_selected, OptionItem};
use crate::state::SharedState;
use crate::views::page_url;

#[derive(Template)]
#[template(path = "cities/index.html")]
struct CitiesIndexTemplate {
    flash: Option<String>,
    search: String,
    countries: Vec<OptionItem>,
    states: Vec<OptionItem>,
    page: Page<CityRow>,
    prev_url: Option<String>,
    next_url: Option<String>,
}

#[derive(Template)]
#[template(path = "cities/create.html")]
struct CityCreateTemplate {
    countries: Vec<OptionItem>,
}

#[derive(Template)]
#[template(path = "cities/edit.html")]
struct CityEditTemplate {
    city_id: i64,
    city_name: String,
    countries: Vec<OptionItem>,
    states: Vec<OptionItem>,
}

#[derive(Deserialize)]
pub struct IndexParams {
    pub s: Option<String>,
    /// Comma-joined country ids or the "all" sentinel.
    pub country: Option<String>,
    pub state: Option<String>,
    pub page: Option<i64>,
}

pub async fn index(
    _gate: Gate<ReadCities>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, AppError> {
    let (jar, flash) = flash::take(jar);
    let search = params.s.clone().unwrap_or_default();
    let country_ids = parse_id_list(params.country.as_deref());
    let state_ids = parse_id_list(params.state.as_deref());

    let page = db::cities::list(
        &state.pool,
        params.s.as_deref(),
        &country_ids,
        &state_ids,
        state.pager,
        params.page.unwrap_or(1),
    )
    .await?;

    // Selector state round-trips: the country options carry the current
    // selection, and the dependent state options come from the same query
    // the async endpoint uses.
    let countries = mark_selected(db::countries::options(&state.pool).await?, &country_ids);
    let states = mark_selected(
        db::states::options_for_countries(&state.pool, &country_ids).await?,
        &state_ids,
    );

    let filter_qs = {
        let mut qs = form_urlencoded::Serializer::new(String::new());
        qs.append_pair("country", &join_or_all(&country_ids));
        qs.append_pair("state", &join_or_all(&state_ids));
        if !search.trim().is_empty() {
            qs.append_pair("s", &search);
        }
        qs.finish()
    };

    let prev_url = page
        .has_prev()
        .then(|| page_url("/admin/cities", &filter_qs, page.page - 1));
    let next_url = page
        .has_next()
        .then(|| page_url("/admin/cities", &filter_qs, page.page + 1));

    let template = CitiesIndexTemplate {
        flash,
        search,
        countries,
        states,
        page,
        prev_url,
        next_url,
    };
    Ok((jar, Html(template.render().unwrap_or_default())))
}

fn join_or_all(ids: &[i64]) -> String {
    if ids.is_empty() {
        "all".to_string()
    } else {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

pub async fn create_page(
    _gate: Gate<CreateCities>,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let countries = db::countries::options(&state.pool).await?;

    let template = CityCreateTemplate { countries };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn edit_page(
    _gate: Gate<UpdateCities>,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let city = db::cities::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("City not found".to_string()))?;

    let city_state = db::states::find_by_id(&state.pool, city.state_id)
        .await?
        .ok_or_else(|| AppError::NotFound("State not found".to_string()))?;

    let countries = mark_selected(
        db::countries::options(&state.pool).await?,
        &[city_state.country_id],
    );
    let states = mark_selected(
        db::states::options_for_countries(&state.pool, &[city_state.country_id]).await?,
        &[city.state_id],
    );

    let template = CityEditTemplate {
        city_id: city.id,
        city_name: city.name,
        countries,
        states,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

#[derive(Deserialize)]
pub struct StoreCity {
    pub name: String,
    pub state_id: i64,
}

pub async fn store(
    gate: Gate<CreateCities>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(req): Form<StoreCity>,
) -> Result<(CookieJar, Redirect), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation(vec![FieldError {
            field: "name",
            message: "Name is required".to_string(),
        }]));
    }

    db::states::find_by_id(&state.pool, req.state_id)
        .await?
        .ok_or_else(|| AppError::NotFound("State not found".to_string()))?;

    let city = db::cities::create(&state.pool, req.state_id, &req.name).await?;
    tracing::info!(city_id = city.id, actor = gate.actor.user_id, "city created");

    Ok((
        flash::set(jar, "City created"),
        Redirect::to("/admin/cities"),
    ))
}

#[derive(Deserialize)]
pub struct UpdateCity {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::views::empty_as_none")]
    pub state_id: Option<i64>,
}

pub async fn update(
    gate: Gate<UpdateCities>,
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(req): Form<UpdateCity>,
) -> Result<(CookieJar, Redirect), AppError> {
    if matches!(&req.name, Some(name) if name.trim().is_empty()) {
        return Err(AppError::Validation(vec![FieldError {
            field: "name",
            message: "Name cannot be blank".to_string(),
        }]));
    }

    if let Some(state_id) = req.state_id {
        db::states::find_by_id(&state.pool, state_id)
            .await?
            .ok_or_else(|| AppError::NotFound("State not found".to_string()))?;
    }

    let changes = db::cities::CityChanges {
        name: req.name,
        state_id: req.state_id,
    };
    let affected = db::cities::update(&state.pool, id, &changes, gate.actor.user_id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("City not found".to_string()));
    }

    Ok((
        flash::set(jar, "City updated"),
        Redirect::to("/admin/cities"),
    ))
}

pub async fn destroy(
    gate: Gate<DeleteCities>,
    State(state): State<SharedState>,
    jar: CookieJar,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<(CookieJar, Redirect), AppError> {
    let affected = db::cities::delete(&state.pool, id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("City not found".to_string()));
    }

    tracing::info!(city_id = id, actor = gate.actor.user_id, "city deleted");

    let back = headers
        .get(REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/admin/cities")
        .to_string();

    Ok((flash::set(jar, "City deleted"), Redirect::to(&back)))
}
