pub(crate) const MESSAGES: &[(&str, &str)] = &[
    (
        "help_intro",
        "<pre>{{ Help }}</pre>\n\nPara más información sobre cada comando escribe <code>/help &lt;comando&gt;</code>.",
    ),
    (
        "help_method",
        "<pre>/{{ MainName }} {{ Argstr }}</pre>\n{{ Help }}\n{% if HasInline %}<b>Consulta inline</b>: también se puede llamar como consulta inline desde grupos o chats personales, p. ej. <code>@{{ ServiceId }} {{ InlineExample }}</code>.\n{% endif %}{% if Aliases %}<b>Alias:</b> <code>{{ Aliases | join(\", \") }}</code>{% endif %}",
    ),
    (
        "help_similar",
        "No se encontró el comando <code>{{ Method }}</code>. ¿Quisiste decir {% for name in Similar %}<code>{{ name }}</code>{% if not loop.last %} o {% endif %}{% endfor %}?",
    ),
    (
        "wrong_command",
        "No se pudo entender el comando. /help",
    ),
    (
        "welcome",
        "Tu cuenta fue creada. Ya puedes recibir y enviar satoshis en este chat o en cualquier grupo donde esté este bot.",
    ),
    (
        "tutorial",
        "{% if Name %}Tutorial <b>{{ Name }}</b>: escribe /help {{ Name }} para ver cómo funciona.{% else %}Escribe /help para ver todo lo que este bot puede hacer.{% endif %}",
    ),
    (
        "stop_notify",
        "Notificaciones desactivadas.",
    ),
    ("error", "Error{% if Err %}: {{ Err }}{% endif %}"),
    (
        "invalid_amount",
        "Cantidad inválida: {{ Amount }}",
    ),
    (
        "invalid_participants",
        "El número de participantes debe estar entre 2 y 100, se recibió {{ Number }}.",
    ),
    (
        "insufficient_balance",
        "Saldo insuficiente para {{ Purpose }}. Se necesitan {{ Sats }} sat.",
    ),
    (
        "rate_limit",
        "¡Demasiadas solicitudes! Espera un poco antes de crear otro juego.",
    ),
    (
        "over_quota",
        "Superaste tu cuota diaria de {{ App }}.",
    ),
    (
        "cant_send_no_receiver",
        "No se pueden enviar {{ Sats }} sat: falta el destinatario.",
    ),
    (
        "save_receiver_fail",
        "No se pudo cargar el destinatario. Probablemente es un error del bot.",
    ),
    (
        "failed_user",
        "No se pudo interpretar el nombre del destinatario.",
    ),
    (
        "failed_send",
        "Falló el envío: {{ Err }}",
    ),
    (
        "user_sent_you_sats",
        "{{ User }} te envió {{ Sats }} sat{% if RawSats != Sats %} ({{ RawSats }}){% endif %}.{% if Note %}\n<i>{{ Note }}</i>{% endif %}",
    ),
    (
        "received_sats_anon",
        "Alguien te envió {{ Sats }} sat.",
    ),
    (
        "user_sent_to_user",
        "{{ Sats }} sat enviados a {{ User }}{% if RawSats != Sats %} ({{ RawSats }}){% endif %}.",
    ),
    (
        "giveaway_msg",
        "¡{{ User }} está regalando {{ Sats }} sat!",
    ),
    ("giveaway_button", "Reclamar"),
    (
        "giveflip_msg",
        "¡{{ User }} está regalando {{ Sats }} sat a una persona afortunada entre {{ Participants }}!",
    ),
    ("giveflip_button", "¡Intenta ganar!"),
    (
        "lottery_msg",
        "¡Comienza una lotería! Entrada: {{ EntrySats }} sat. Participantes: {{ Participants }}. Premio: {{ Prize }} sat. Inscritos: {{ Registered }}",
    ),
    ("lottery_button", "¡Participar!"),
    (
        "coinflips_enabled_msg",
        "Las loterías están {% if Enabled %}habilitadas{% else %}deshabilitadas{% endif %} en este grupo.",
    ),
    (
        "fundraise_ad",
        "Recaudando {{ Fund }} sat para {{ ToUser }}: {{ Participants }} participantes, {{ Sats }} sat cada uno. Inscritos: {{ Registered }}",
    ),
    ("fundraise_button", "¡Contribuir!"),
    (
        "hidden_with_id",
        "Mensaje oculto con id <code>{{ HiddenId }}</code>. {% if Public %}Se revelará públicamente cuando sea pagado{% if Crowdfund > 1 %} por {{ Crowdfund }} personas{% endif %}.{% else %}Se revelará en privado a {% if Times > 0 %}los primeros {{ Times }} que paguen{% else %}quien pague{% endif %}.{% endif %} Precio: {{ Satoshis }} sat.",
    ),
    ("hidden_share_button", "Compartir en otro chat"),
    ("hidden_reveal_button", "Pagar {{ Sats }} sat para revelar"),
    (
        "hidden_msg_not_found",
        "No se encontró el mensaje oculto.",
    ),
    (
        "hidden_no_content",
        "Nada que ocultar: responde a un mensaje o escribe <code>vista~contenido</code>.",
    ),
    (
        "lnurl_invalid",
        "lnurl inválido: {{ Err }}",
    ),
    (
        "lnurl_fail",
        "No se pudo completar la solicitud lnurl: {{ Err }}",
    ),
    (
        "lnurl_voucher",
        "<a href=\"lightning:{{ Lnurl }}\">{{ Lnurl }}</a>",
    ),
    (
        "invoice_created",
        "<code>{{ Invoice }}</code>",
    ),
    (
        "pay_missing_invoice",
        "No se encontró ninguna factura. Envía <code>/pay &lt;factura&gt;</code> o responde a un mensaje que la contenga.",
    ),
    (
        "pay_confirm",
        "{% if Description %}<i>{{ Description }}</i>\n{% endif %}¿Pagar {{ Sats }} sat?\n<b>Hash</b>: {{ Hash }}",
    ),
    ("pay_confirm_button", "Confirmar"),
    ("cancel_button", "Cancelar"),
    (
        "payment_sent",
        "Pago de {{ Sats }} sat enviado.",
    ),
    (
        "payment_failed",
        "Falló el pago: {{ Err }}",
    ),
    (
        "decoded_invoice",
        "<b>Cantidad</b>: {% if Sats %}{{ Sats }} sat{% else %}cualquiera{% endif %}\n<b>Descripción</b>: {{ Description }}\n<b>Beneficiario</b>: {{ Payee }}\n<b>Hash</b>: {{ Hash }}",
    ),
    (
        "balance_msg",
        "<b>Saldo</b>: {{ Sats }} sat\n<b>Total recibido</b>: {{ Received }} sat\n<b>Total enviado</b>: {{ Sent }} sat\n<b>Comisiones pagadas</b>: {{ Fees }} sat",
    ),
    (
        "transactions_list",
        "<b>Transacciones</b>\n{% for tx in Transactions %}<code>{{ tx.sign }}{{ tx.sats }}</code> {% if tx.pending %}(pendiente) {% endif %}{{ tx.description }} /tx_{{ tx.hash }}\n{% else %}Todavía no hay transacciones.{% endfor %}",
    ),
    (
        "transaction_detail",
        "<b>Hash</b>: {{ Hash }}\n<b>Cantidad</b>: {{ Sats }} sat\n<b>Descripción</b>: {{ Description }}{% if Pending %}\n<b>Estado</b>: pendiente{% endif %}",
    ),
    (
        "transaction_not_found",
        "No se encontró la transacción {{ Hash }}.",
    ),
    (
        "group_not_renamable",
        "No está permitido renombrar este grupo.",
    ),
    (
        "rename_prompt",
        "¿Pagar {{ Sats }} sat para renombrar este grupo a <i>{{ Name }}</i>?",
    ),
    ("rename_button", "Pagar y renombrar"),
    (
        "free_join",
        "Ahora cualquiera puede unirse gratis a este grupo.",
    ),
    (
        "ticket_msg",
        "Los nuevos miembros tendrán que pagar una factura de {{ Sat }} sat (asegúrate de que @{{ BotName }} sea administrador para que funcione).",
    ),
    (
        "renamable_msg",
        "Cualquiera puede renombrar este grupo por {{ Sat }} sat (asegúrate de que @{{ BotName }} sea administrador para que funcione).",
    ),
    (
        "spammy_msg",
        "{% if Spammy %}Este grupo ahora recibe notificaciones.{% else %}Ya no se enviarán notificaciones a este grupo.{% endif %}",
    ),
    (
        "language_msg",
        "Idioma cambiado a <code>{{ Language }}</code>.",
    ),
    (
        "receive_help",
        "Genera una factura BOLT11 por la cantidad de satoshis indicada, que se suma a tu saldo. Sin cantidad, la factura acepta cualquier monto. <code>lnurl</code> cobra un voucher de retiro en tu saldo.",
    ),
    (
        "pay_help",
        "Decodifica una factura BOLT11 y pregunta si quieres pagarla (excepto con /paynow). Es lo mismo que pegar o reenviar la factura en el chat. <code>lnurl</code> genera un voucher de retiro; con una cantidad paga sin preguntar.",
    ),
    (
        "send_help",
        "Envía satoshis a otros usuarios de Telegram, que reciben la notificación en su chat con el bot. Responde a un mensaje para enviar a su autor; el texto extra se adjunta como nota.",
    ),
    (
        "balance_help",
        "Muestra tu saldo actual en satoshis, junto con el total recibido, el total enviado y las comisiones pagadas.",
    ),
    (
        "giveaway_help",
        "Crea un botón en el grupo. La primera persona que lo pulse se lleva los satoshis.",
    ),
    (
        "coinflip_help",
        "Inicia una lotería justa con el número de participantes indicado. Todos pagan la misma entrada y el ganador se lleva todo.",
    ),
    (
        "giveflip_help",
        "Inicia un regalo que se sortea entre las primeras x personas que pulsen el botón.",
    ),
    (
        "fundraise_help",
        "Inicia una recaudación con un número fijo de participantes y aportes. Cuando todos se unen, el total se envía al destinatario.",
    ),
    (
        "hide_help",
        "Oculta un mensaje que se puede desbloquear pagando. Responde a un mensaje o escribe <code>vista~contenido</code>. <code>--revealers</code> limita las revelaciones privadas; <code>--crowdfund</code> exige esa cantidad de pagos y lo revela en público.",
    ),
    (
        "reveal_help",
        "Revela un mensaje oculto. El autor del mensaje nunca se muestra.",
    ),
    (
        "toggle_help",
        "Cambia opciones del grupo: <code>ticket</code> cobra a los nuevos miembros, <code>renamable</code> permite renombrar el grupo pagando, <code>spammy</code> muestra notificaciones en el grupo, <code>coinflips</code> habilita juegos, <code>language</code> cambia el idioma del bot.",
    ),
    (
        "help_help",
        "Muestra la ayuda completa o la de un comando específico.",
    ),
    (
        "lnurl_help",
        "Cobra un voucher lnurl-withdraw en tu saldo.",
    ),
];
