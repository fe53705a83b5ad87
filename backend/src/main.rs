use moon::*;

/// The page never talks to the host after loading; analysis runs in the
/// browser worker. The host only serves the page and `/_api/public/` assets.
#[derive(serde::Deserialize, Debug)]
enum UpMsg {}

async fn frontend() -> Frontend {
    Frontend::new()
        .title("GSEA")
        .index_by_robots(false)
}

async fn up_msg_handler(req: UpMsgRequest<UpMsg>) {
    match req.up_msg {}
}

#[moon::main]
async fn main() -> std::io::Result<()> {
    // Set panic hook to log all panics
    std::panic::set_hook(Box::new(|panic_info| {
        println!("BACKEND PANIC: {:?}", panic_info);
    }));

    start(frontend, up_msg_handler, |_error| {}).await
}
