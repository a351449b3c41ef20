use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use geocercas::config::EnvironmentConfig;
use geocercas::models::auth::{Empresa, Sesion};
use geocercas::models::vendedor::Vendedor;
use geocercas::{create_app_router, AppState};

fn token_con_expiracion(segundos: i64) -> String {
    let claims = json!({
        "sub": "juan-perez",
        "exp": chrono::Utc::now().timestamp() + segundos,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"prueba")).unwrap()
}

fn empresa_demo() -> Empresa {
    Empresa {
        id: 7,
        nomempresa: "Distribuidora Andina".to_string(),
        flag: true,
    }
}

fn estado_de_prueba() -> AppState {
    AppState::new(EnvironmentConfig::for_tests()).unwrap()
}

/// App con sesión válida, empresa seleccionada y el mapa de geocercas listo
async fn app_autenticada() -> (Router, String) {
    let state = estado_de_prueba();
    let token = token_con_expiracion(3600);
    state
        .auth
        .establecer(Sesion {
            username: "juan-perez".to_string(),
            token: token.clone(),
            empresa_seleccionada: Some(empresa_demo()),
            empresas: vec![empresa_demo()],
        })
        .await
        .unwrap();

    let app = create_app_router(state);
    let (status, _) = enviar(
        &app,
        Method::POST,
        "/api/mapa/geocercas/contenedor",
        Some(json!({ "ancho": 800, "alto": 600 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (app, token)
}

async fn respuesta(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn enviar(app: &Router, metodo: Method, uri: &str, cuerpo: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(metodo).uri(uri);
    let request = match cuerpo {
        Some(valor) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&valor).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = respuesta(app, request).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let valor = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, valor)
}

async fn capas_de(app: &Router, entidad: &str) -> Vec<Value> {
    let (status, body) = enviar(app, Method::GET, "/api/mapa/geocercas", None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["capas"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["entidad"] == entidad)
        .cloned()
        .collect()
}

async fn ids_geocercas(app: &Router) -> Vec<String> {
    let (status, body) = enviar(app, Method::GET, "/api/geocercas", None).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["geocercas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_endpoint_publico() {
    let app = create_app_router(estado_de_prueba());
    let (status, body) = enviar(&app, Method::GET, "/test", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_sin_sesion_redirige_al_login() {
    let app = create_app_router(estado_de_prueba());
    let (status, body) = enviar(&app, Method::GET, "/api/geocercas", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/auth/login");

    let (status, body) = enviar(&app, Method::GET, "/api/auth/sesion", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["autenticado"], false);
}

#[tokio::test]
async fn test_sesion_sin_empresa_es_prohibida() {
    let state = estado_de_prueba();
    state
        .auth
        .establecer(Sesion {
            username: "juan-perez".to_string(),
            token: token_con_expiracion(3600),
            empresa_seleccionada: None,
            empresas: vec![empresa_demo()],
        })
        .await
        .unwrap();
    let app = create_app_router(state);

    let (status, _) = enviar(&app, Method::GET, "/api/geocercas", None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = enviar(&app, Method::POST, "/api/auth/empresa", Some(json!({ "id": 7 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empresa"], "Distribuidora Andina");

    let (status, _) = enviar(&app, Method::GET, "/api/geocercas", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_token_expirado_cierra_la_sesion() {
    let state = estado_de_prueba();
    state
        .auth
        .establecer(Sesion {
            username: "juan-perez".to_string(),
            token: token_con_expiracion(-60),
            empresa_seleccionada: Some(empresa_demo()),
            empresas: vec![empresa_demo()],
        })
        .await
        .unwrap();
    let app = create_app_router(state.clone());

    let (status, _) = enviar(&app, Method::GET, "/api/registros", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(state.auth.sesion().await.is_none());
}

#[tokio::test]
async fn test_bearer_distinto_al_de_la_sesion() {
    let (app, token) = app_autenticada().await;

    let otro = Request::builder()
        .uri("/api/geocercas")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_con_expiracion(10)))
        .body(Body::empty())
        .unwrap();
    assert_eq!(respuesta(&app, otro).await.status(), StatusCode::UNAUTHORIZED);

    let mismo = Request::builder()
        .uri("/api/geocercas")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    assert_eq!(respuesta(&app, mismo).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_crear_circulo_desde_el_editor() {
    let (app, _) = app_autenticada().await;
    let antes = ids_geocercas(&app).await;

    let (_, body) = enviar(&app, Method::POST, "/api/editor/modo", None).await;
    assert_eq!(body["data"]["modoCreacion"], true);

    let (status, body) = enviar(
        &app,
        Method::POST,
        "/api/editor/click",
        Some(json!({ "lat": -12.05, "lng": -77.04 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["puedeConfirmar"], true);

    let (status, body) = enviar(&app, Method::POST, "/api/editor/confirmar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["formulario"]["latitud"], -12.05);
    assert_eq!(body["data"]["formulario"]["radio"], 300.0);

    let (status, _) = enviar(
        &app,
        Method::PATCH,
        "/api/editor/formulario",
        Some(json!({ "nombre": "Mercado Central" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = enviar(&app, Method::POST, "/api/editor/guardar", None).await;
    assert_eq!(status, StatusCode::OK);
    let creada = &body["data"];
    assert_eq!(creada["forma"], "circulo");
    assert_eq!(creada["radio"], 300.0);
    assert!(creada.get("puntos").is_none());
    let id = creada["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("gc-"));

    // se agrega al final de la colección
    let despues = ids_geocercas(&app).await;
    assert_eq!(despues.len(), antes.len() + 1);
    assert_eq!(despues.last(), Some(&id));

    // marcador + círculo
    let capas = capas_de(&app, &id).await;
    assert_eq!(capas.len(), 2);
    assert!(capas.iter().any(|c| c["figura"]["tipo"] == "circulo"));

    let (_, body) = enviar(&app, Method::GET, "/api/editor", None).await;
    assert_eq!(body["data"]["estado"], "inactivo");
}

#[tokio::test]
async fn test_crear_poligono_de_tres_puntos() {
    let (app, _) = app_autenticada().await;

    enviar(&app, Method::POST, "/api/editor/modo", None).await;
    enviar(&app, Method::POST, "/api/editor/forma", Some(json!({ "forma": "poligono" }))).await;

    let puntos = [(-0.18, -78.50), (-0.19, -78.49), (-0.20, -78.51)];
    for (i, (lat, lng)) in puntos.iter().enumerate() {
        let (_, body) = enviar(
            &app,
            Method::POST,
            "/api/editor/click",
            Some(json!({ "lat": lat, "lng": lng })),
        )
        .await;
        assert_eq!(body["data"]["puedeConfirmar"], i == 2);
    }

    let (status, body) = enviar(&app, Method::POST, "/api/editor/confirmar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["formulario"].get("radio").map_or(true, Value::is_null));

    enviar(
        &app,
        Method::PATCH,
        "/api/editor/formulario",
        Some(json!({ "nombre": "Zona Sur" })),
    )
    .await;
    let (status, body) = enviar(&app, Method::POST, "/api/editor/guardar", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["forma"], "poligono");
    assert_eq!(body["data"]["puntos"].as_array().unwrap().len(), 3);
    assert!(body["data"].get("radio").is_none());
}

#[tokio::test]
async fn test_confirmar_sin_borrador_listo_es_conflicto() {
    let (app, _) = app_autenticada().await;

    enviar(&app, Method::POST, "/api/editor/modo", None).await;
    enviar(&app, Method::POST, "/api/editor/forma", Some(json!({ "forma": "poligono" }))).await;
    enviar(&app, Method::POST, "/api/editor/click", Some(json!({ "lat": -0.18, "lng": -78.5 }))).await;

    let (status, _) = enviar(&app, Method::POST, "/api/editor/confirmar", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_guardar_sin_nombre_no_cierra_el_formulario() {
    let (app, _) = app_autenticada().await;
    let antes = ids_geocercas(&app).await;

    enviar(&app, Method::POST, "/api/editor/modo", None).await;
    enviar(&app, Method::POST, "/api/editor/click", Some(json!({ "lat": -0.2, "lng": -78.5 }))).await;
    enviar(&app, Method::POST, "/api/editor/confirmar", None).await;

    let (status, body) = enviar(&app, Method::POST, "/api/editor/guardar", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Por favor completa todos los campos obligatorios");

    let (_, body) = enviar(&app, Method::GET, "/api/editor", None).await;
    assert_eq!(body["data"]["estado"], "formularioAbierto");
    assert_eq!(ids_geocercas(&app).await, antes);
}

#[tokio::test]
async fn test_editar_reemplaza_en_su_posicion() {
    let (app, _) = app_autenticada().await;
    let antes = ids_geocercas(&app).await;

    let (status, body) = enviar(&app, Method::POST, "/api/editor/editar/gc-002", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["enEdicion"], "gc-002");

    enviar(
        &app,
        Method::PATCH,
        "/api/editor/formulario",
        Some(json!({ "nombre": "Parque Renombrado", "radio": 950.0 })),
    )
    .await;
    let (status, body) = enviar(&app, Method::POST, "/api/editor/guardar", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Geocerca actualizada exitosamente");

    assert_eq!(ids_geocercas(&app).await, antes);
    let (_, body) = enviar(&app, Method::GET, "/api/geocercas/gc-002", None).await;
    assert_eq!(body["data"]["nombre"], "Parque Renombrado");
    assert_eq!(body["data"]["radio"], 950.0);
}

#[tokio::test]
async fn test_alternar_estado_solo_cambia_opacidades() {
    let (app, _) = app_autenticada().await;
    enviar(&app, Method::GET, "/api/geocercas", None).await;

    let figura = |capas: &[Value]| {
        capas
            .iter()
            .find(|c| c["figura"]["tipo"] == "circulo")
            .map(|c| c["figura"].clone())
            .unwrap()
    };
    let antes = figura(&capas_de(&app, "gc-001").await);
    assert_eq!(antes["estilo"]["fillOpacity"], 0.2);

    let (status, body) = enviar(&app, Method::POST, "/api/geocercas/gc-001/estado", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["activa"], false);

    let despues = figura(&capas_de(&app, "gc-001").await);
    assert_eq!(despues["estilo"]["fillOpacity"], 0.1);
    assert_eq!(despues["estilo"]["opacity"], 0.5);
    assert_eq!(despues["radio"], antes["radio"]);
    assert_eq!(despues["centro"], antes["centro"]);
    assert_eq!(despues["estilo"]["color"], antes["estilo"]["color"]);
}

#[tokio::test]
async fn test_redibujar_no_duplica_capas() {
    let (app, _) = app_autenticada().await;

    enviar(&app, Method::GET, "/api/geocercas", None).await;
    let (_, primera) = enviar(&app, Method::GET, "/api/mapa/geocercas", None).await;
    enviar(&app, Method::GET, "/api/geocercas", None).await;
    let (_, segunda) = enviar(&app, Method::GET, "/api/mapa/geocercas", None).await;

    let total = |v: &Value| v["data"]["capas"].as_array().unwrap().len();
    assert!(total(&primera) > 0);
    assert_eq!(total(&primera), total(&segunda));
}

#[tokio::test]
async fn test_filtro_por_forma() {
    let (app, _) = app_autenticada().await;

    let (status, body) = enviar(&app, Method::GET, "/api/geocercas?forma=poligono", None).await;
    assert_eq!(status, StatusCode::OK);
    let geocercas = body["data"]["geocercas"].as_array().unwrap();
    assert!(!geocercas.is_empty());
    assert!(geocercas.iter().all(|g| g["forma"] == "poligono"));
    assert!(body["data"]["total"].as_u64().unwrap() > geocercas.len() as u64);
}

#[tokio::test]
async fn test_eliminar_geocerca() {
    let (app, _) = app_autenticada().await;

    let (status, _) = enviar(&app, Method::DELETE, "/api/geocercas/gc-003", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!ids_geocercas(&app).await.contains(&"gc-003".to_string()));
    assert!(capas_de(&app, "gc-003").await.is_empty());

    let (status, _) = enviar(&app, Method::GET, "/api/geocercas/gc-003", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_descarga_csv_de_registros() {
    let (app, _) = app_autenticada().await;

    let (status, body) = enviar(
        &app,
        Method::GET,
        "/api/registros?desde=2000-01-01&hasta=2100-12-31",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["filtrados"].as_u64().unwrap() > 0);

    let request = Request::builder().uri("/api/registros/csv").body(Body::empty()).unwrap();
    let response = respuesta(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let tipo = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    let disposicion = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(tipo.starts_with("text/csv"));
    assert!(disposicion.starts_with("attachment; filename=\"detalle_registros_"));
    assert!(disposicion.ends_with(".csv\""));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.lines().count() > 1);
}

#[tokio::test]
async fn test_rango_de_fechas_invertido() {
    let (app, _) = app_autenticada().await;

    let (status, _) = enviar(
        &app,
        Method::GET,
        "/api/registros?desde=2025-08-01&hasta=2025-07-01",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dashboard_con_empresa() {
    let (app, _) = app_autenticada().await;

    let (status, body) = enviar(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["empresa"], "Distribuidora Andina");
    assert_eq!(body["data"]["iniciales"], "JP");
}

#[tokio::test]
async fn test_mapa_sin_contenedor_no_esta_listo() {
    let (app, _) = app_autenticada().await;

    let (status, body) = enviar(&app, Method::POST, "/api/mapa/registros/reintentar", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "MAP_NOT_READY");

    let (_, body) = enviar(&app, Method::GET, "/api/mapa/registros", None).await;
    assert_eq!(body["data"]["estado"]["estado"], "error");
}

#[tokio::test]
async fn test_busqueda_vacia_no_consulta_nominatim() {
    let (app, _) = app_autenticada().await;

    let (status, body) = enviar(&app, Method::GET, "/api/lugares/buscar?q=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["estado"], "ejecutada");
    assert!(body["data"]["lugares"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cambio_de_empresa_y_logout_vacian_vendedores() {
    let state = estado_de_prueba();
    let otra = Empresa { id: 8, nomempresa: "Comercial Sierra".to_string(), flag: true };
    state
        .auth
        .establecer(Sesion {
            username: "juan-perez".to_string(),
            token: token_con_expiracion(3600),
            empresa_seleccionada: Some(empresa_demo()),
            empresas: vec![empresa_demo(), otra],
        })
        .await
        .unwrap();

    let vendedor: Vendedor = serde_json::from_value(json!({
        "id": "V001", "codigo": "V001", "nombre": "Luis",
        "lat": -0.18, "lng": -78.46, "estado": "activo"
    }))
    .unwrap();
    let cargar_pagina = |state: AppState, vendedor: Vendedor| async move {
        let vista = state.vendedores.vista();
        let mut v = vista.write().await;
        v.vendedores = vec![vendedor];
        v.seleccionado = Some("V001".to_string());
    };
    cargar_pagina(state.clone(), vendedor.clone()).await;

    let app = create_app_router(state.clone());
    let (_, body) = enviar(&app, Method::GET, "/api/vendedores", None).await;
    assert_eq!(body["data"]["vendedores"].as_array().unwrap().len(), 1);

    let (status, _) = enviar(&app, Method::POST, "/api/auth/empresa", Some(json!({ "id": 8 }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = enviar(&app, Method::GET, "/api/vendedores", None).await;
    assert!(body["data"]["vendedores"].as_array().unwrap().is_empty());
    assert!(state.vendedores.vista().read().await.seleccionado.is_none());

    cargar_pagina(state.clone(), vendedor).await;
    let (status, _) = enviar(&app, Method::POST, "/api/auth/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    let vista = state.vendedores.vista();
    let vista = vista.read().await;
    assert!(vista.vendedores.is_empty());
    assert!(vista.paginacion.is_none());
    assert!(vista.suscrita());
}
