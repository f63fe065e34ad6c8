use crate::classifier::classify;
use crate::context::AppContext;
use crate::error::PredictError;
use crate::models::{PredictionResult, ResultPage, UploadedImage};
use crate::preprocess::load_image;
use crate::upload::{content_type_for, discard, receive_image, resolve_stored};
use actix_multipart::Multipart;
use actix_web::{web, Error, HttpResponse, Result};
use std::fs;
use std::io::ErrorKind;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/predict").route(web::post().to(predict)))
        .service(web::resource("/about").route(web::get().to(about)))
        .service(web::resource("/uploads/{filename}").route(web::get().to(uploaded_file)));
}

fn html(body: tera::Result<String>) -> Result<HttpResponse, Error> {
    let body = body.map_err(|e| {
        log::error!("Failed to render page: {}", e);
        actix_web::error::ErrorInternalServerError("Could not render page")
    })?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub async fn index(ctx: web::Data<AppContext>) -> Result<HttpResponse, Error> {
    html(ctx.pages.home())
}

pub async fn about(ctx: web::Data<AppContext>) -> Result<HttpResponse, Error> {
    html(ctx.pages.about())
}

pub async fn predict(
    ctx: web::Data<AppContext>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    match run_prediction(&ctx, payload).await {
        Ok((result, image)) => {
            log::info!(
                "Predicted class {} ({}) for {:?} [{}]",
                result.class_index,
                result.label,
                image.original_name,
                image.content_type
            );
            let message = result.message();
            let url = image.url();
            html(ctx.pages.result(&ResultPage {
                prediction: &message,
                uploaded_file: Some(&url),
            }))
        }
        Err(err) => {
            match &err {
                PredictError::MissingFile => log::debug!("Predict request without an image"),
                PredictError::Decode(_) | PredictError::Upload(_) => log::warn!("{}", err),
                PredictError::Storage(_) | PredictError::Inference(_) => log::error!("{}", err),
            }
            html(ctx.pages.result(&ResultPage {
                prediction: err.user_message(),
                uploaded_file: None,
            }))
        }
    }
}

async fn run_prediction(
    ctx: &AppContext,
    payload: Multipart,
) -> Result<(PredictionResult, UploadedImage), PredictError> {
    let image = receive_image(payload, &ctx.upload_dir).await?;

    let classifier = ctx.classifier.clone();
    let labels = ctx.labels.clone();
    let path = image.path.clone();
    // decoding and inference both block
    let outcome = web::block(move || {
        let tensor = load_image(&path)?;
        classify(classifier.as_ref(), &labels, &tensor)
    })
    .await
    .map_err(|e| PredictError::Inference(e.to_string()))
    .and_then(|result| result);

    match outcome {
        Ok(result) => Ok((result, image)),
        Err(err) => {
            // the error page never links the upload
            discard(image.path).await;
            Err(err)
        }
    }
}

pub async fn uploaded_file(
    ctx: web::Data<AppContext>,
    filename: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let path = resolve_stored(&ctx.upload_dir, &filename)
        .ok_or_else(|| actix_web::error::ErrorNotFound("No such upload"))?;
    let content_type = content_type_for(&path);

    let bytes = web::block(move || fs::read(path)).await?.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            actix_web::error::ErrorNotFound("No such upload")
        } else {
            log::error!("Failed to read upload: {}", e);
            actix_web::error::ErrorInternalServerError("Could not read upload")
        }
    })?;

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
