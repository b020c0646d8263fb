pub use image_descriptor::api::handler;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    image_descriptor::setup_logging();
    lambda_runtime::run(lambda_runtime::service_fn(handler)).await
}
